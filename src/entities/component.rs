//! Component entity type - a deliverable part of a software product

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::{self, NAME_MAX};
use crate::entities::contact::ContactKind;

/// Contacts responsible for a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentContacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineering: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psrd: Option<EntityId>,
}

impl ComponentContacts {
    /// Contact assigned for the given role
    pub fn get(&self, kind: ContactKind) -> Option<&EntityId> {
        match kind {
            ContactKind::Engineering => self.engineering.as_ref(),
            ContactKind::Business => self.business.as_ref(),
            ContactKind::Psrd => self.psrd.as_ref(),
        }
    }

    /// All assigned contacts with their role
    pub fn iter(&self) -> impl Iterator<Item = (ContactKind, &EntityId)> {
        ContactKind::all()
            .iter()
            .filter_map(move |kind| self.get(*kind).map(|id| (*kind, id)))
    }
}

/// Release milestones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_preview: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_preview: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_availability: Option<NaiveDate>,
}

/// A component entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: EntityId,

    /// Component name (unique across all software)
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Source repository
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo_url: String,

    /// Owning software product
    pub software: EntityId,

    #[serde(default)]
    pub contacts: ComponentContacts,

    /// Tracking ticket
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ticket_url: String,

    #[serde(default)]
    pub milestones: Milestones,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Component {
    const PREFIX: EntityPrefix = EntityPrefix::Cmp;

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
        validation::name("component", "name", &self.name, NAME_MAX)?;
        validation::optional_url("component", "repo_url", &self.repo_url)?;
        validation::optional_url("component", "ticket_url", &self.ticket_url)?;
        if self.software.prefix() != EntityPrefix::Sw {
            return Err(StoreError::validation(
                "component",
                "software",
                format!("expected a software id, got {}", self.software),
            ));
        }
        for (kind, id) in self.contacts.iter() {
            if id.prefix() != EntityPrefix::Con {
                return Err(StoreError::validation(
                    "component",
                    format!("{}_contact", kind),
                    format!("expected a contact id, got {}", id),
                ));
            }
        }
        Ok(())
    }
}

impl Component {
    pub fn new(name: impl Into<String>, software: EntityId) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Cmp),
            name: name.into(),
            description: String::new(),
            repo_url: String::new(),
            software,
            contacts: ComponentContacts::default(),
            ticket_url: String::new(),
            milestones: Milestones::default(),
            created: now,
            modified: now,
        }
    }
}
