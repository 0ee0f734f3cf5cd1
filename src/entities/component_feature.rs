//! ComponentFeature - a feature's implementation record within one component

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Priority, Status};
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation;

/// Join entity between a component and a feature, unique per pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentFeature {
    pub id: EntityId,

    pub component: EntityId,

    pub feature: EntityId,

    /// Component name, filled in by the store on read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component_name: String,

    /// Feature name, filled in by the store on read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feature_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ticket_url: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for ComponentFeature {
    const PREFIX: EntityPrefix = EntityPrefix::Cfeat;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} - {}", self.component_name, self.feature_name)
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.component.prefix() != EntityPrefix::Cmp {
            return Err(StoreError::validation(
                "component feature",
                "component",
                format!("expected a component id, got {}", self.component),
            ));
        }
        if self.feature.prefix() != EntityPrefix::Feat {
            return Err(StoreError::validation(
                "component feature",
                "feature",
                format!("expected a feature id, got {}", self.feature),
            ));
        }
        validation::optional_url("component feature", "ticket_url", &self.ticket_url)
    }
}

impl ComponentFeature {
    pub fn new(component: EntityId, feature: EntityId) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Cfeat),
            component,
            feature,
            component_name: String::new(),
            feature_name: String::new(),
            description: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            ticket_url: String::new(),
            created: now,
            modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_feature_defaults() {
        let cf = ComponentFeature::new(
            EntityId::new(EntityPrefix::Cmp),
            EntityId::new(EntityPrefix::Feat),
        );
        assert_eq!(cf.priority, Priority::Medium);
        assert_eq!(cf.status, Status::Todo);
        assert!(cf.validate().is_ok());
    }

    #[test]
    fn test_component_feature_swapped_ids_rejected() {
        let cf = ComponentFeature::new(
            EntityId::new(EntityPrefix::Feat),
            EntityId::new(EntityPrefix::Cmp),
        );
        assert_eq!(cf.validate().unwrap_err().field(), Some("component"));
    }
}
