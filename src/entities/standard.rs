//! Standards and the requirements they define

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation;

/// A compliance standard (name and code are each unique)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standard {
    pub id: EntityId,

    pub name: String,

    /// Short code, e.g. "ISO27001"
    pub code: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Standard {
    const PREFIX: EntityPrefix = EntityPrefix::Std;

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
        validation::name("standard", "name", &self.name, 300)?;
        validation::name("standard", "code", &self.code, 100)
    }
}

impl Standard {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Std),
            name: name.into(),
            code: code.into(),
            description: String::new(),
            created: now,
            modified: now,
        }
    }
}

/// An obligation defined by a standard; unique per (standard, definition)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub id: EntityId,

    pub standard: EntityId,

    /// Full requirement text
    pub definition: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Requirement {
    const PREFIX: EntityPrefix = EntityPrefix::Req;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        if !self.code.is_empty() {
            format!("{} {}", self.code, self.name).trim_end().to_string()
        } else if !self.name.is_empty() {
            self.name.clone()
        } else {
            self.definition.clone()
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        validation::required("requirement", "definition", &self.definition)?;
        validation::max_len("requirement", "name", &self.name, 300)?;
        validation::max_len("requirement", "code", &self.code, 100)?;
        if self.standard.prefix() != EntityPrefix::Std {
            return Err(StoreError::validation(
                "requirement",
                "standard",
                format!("expected a standard id, got {}", self.standard),
            ));
        }
        Ok(())
    }
}

impl Requirement {
    pub fn new(standard: EntityId, definition: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Req),
            standard,
            definition: definition.into(),
            name: String::new(),
            code: String::new(),
            created: now,
            modified: now,
        }
    }
}
