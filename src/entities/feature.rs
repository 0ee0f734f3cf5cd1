//! Feature and feature category entity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::{self, NAME_MAX};

/// A product capability that components may implement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Optional grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntityId>,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Feature {
    const PREFIX: EntityPrefix = EntityPrefix::Feat;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        validation::name("feature", "name", &self.name, NAME_MAX)?;
        match &self.category {
            Some(id) if id.prefix() != EntityPrefix::Fcat => Err(StoreError::validation(
                "feature",
                "category",
                format!("expected a feature category id, got {}", id),
            )),
            _ => Ok(()),
        }
    }
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Feat),
            name: name.into(),
            description: String::new(),
            category: None,
            created: now,
            modified: now,
        }
    }
}

/// Groups related features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCategory {
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for FeatureCategory {
    const PREFIX: EntityPrefix = EntityPrefix::Fcat;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        validation::name("feature category", "name", &self.name, NAME_MAX)
    }
}

impl FeatureCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Fcat),
            name: name.into(),
            description: description.into(),
            created: now,
            modified: now,
        }
    }
}
