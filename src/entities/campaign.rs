//! Campaign entity type - groups work across components

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::{self, NAME_MAX};

/// A campaign tracking component features and activity executions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ticket_url: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Campaign {
    const PREFIX: EntityPrefix = EntityPrefix::Camp;

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
        validation::name("campaign", "name", &self.name, NAME_MAX)?;
        validation::optional_url("campaign", "ticket_url", &self.ticket_url)
    }
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Camp),
            name: name.into(),
            description: String::new(),
            status: Status::default(),
            due_date: None,
            ticket_url: String::new(),
            created: now,
            modified: now,
        }
    }

    /// Whether new work may still be attached to this campaign
    pub fn is_selectable(&self) -> bool {
        self.status.is_pending()
    }
}
