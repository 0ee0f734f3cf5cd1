//! Threat entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::{self, NAME_MAX};

/// A catalogued threat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Threat {
    const PREFIX: EntityPrefix = EntityPrefix::Thr;

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
        validation::name("threat", "name", &self.name, NAME_MAX)
    }
}

impl Threat {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Thr),
            name: name.into(),
            description: description.into(),
            created: now,
            modified: now,
        }
    }
}
