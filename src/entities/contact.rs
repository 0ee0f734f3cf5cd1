//! Contact entity type - people referenced by components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::{self, NAME_MAX};

/// Role a contact plays for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ContactKind {
    #[default]
    Engineering,
    Business,
    Psrd,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Engineering => "engineering",
            ContactKind::Business => "business",
            ContactKind::Psrd => "psrd",
        }
    }

    pub fn all() -> &'static [ContactKind] {
        &[
            ContactKind::Engineering,
            ContactKind::Business,
            ContactKind::Psrd,
        ]
    }
}

impl std::fmt::Display for ContactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "engineering" => Ok(ContactKind::Engineering),
            "business" => Ok(ContactKind::Business),
            "psrd" => Ok(ContactKind::Psrd),
            _ => Err(format!(
                "Invalid contact kind: {}. Use engineering, business, or psrd",
                s
            )),
        }
    }
}

/// A person who can be assigned as a component contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: EntityId,

    pub name: String,

    /// Email address; blank contacts are skipped by the campaign rollup
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    #[serde(default)]
    pub kind: ContactKind,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Contact {
    const PREFIX: EntityPrefix = EntityPrefix::Con;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        if self.email.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} <{}>", self.name, self.email.trim())
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        validation::name("contact", "name", &self.name, NAME_MAX)?;
        validation::max_len("contact", "email", &self.email, 254)?;
        validation::optional_email("contact", "email", &self.email)
    }
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>, kind: ContactKind) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Con),
            name: name.into(),
            email: email.into(),
            kind,
            created: now,
            modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_blank_email_is_allowed() {
        let contact = Contact::new("Pat", "", ContactKind::Business);
        assert!(contact.validate().is_ok());
        assert_eq!(contact.label(), "Pat");
    }

    #[test]
    fn test_contact_rejects_malformed_email() {
        let contact = Contact::new("Pat", "pat-at-example.com", ContactKind::Engineering);
        assert_eq!(contact.validate().unwrap_err().field(), Some("email"));
    }

    #[test]
    fn test_contact_kind_parse() {
        assert_eq!("PSRD".parse::<ContactKind>().unwrap(), ContactKind::Psrd);
        assert!("legal".parse::<ContactKind>().is_err());
    }
}
