//! Link entity type - Jira tickets, results and documents attached to work items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation;

/// What a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    JiraTicket,
    Result,
    Document,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::JiraTicket => "jira_ticket",
            LinkKind::Result => "result",
            LinkKind::Document => "document",
        }
    }

    /// Owner types this kind of link may be attached to
    pub fn allowed_owners(&self) -> &'static [OwnerKind] {
        match self {
            LinkKind::JiraTicket | LinkKind::Result => {
                &[OwnerKind::Activity, OwnerKind::ComponentActivity]
            }
            LinkKind::Document => &[
                OwnerKind::Activity,
                OwnerKind::ComponentActivity,
                OwnerKind::ComponentFeature,
            ],
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "jira_ticket" | "jira" | "ticket" => Ok(LinkKind::JiraTicket),
            "result" => Ok(LinkKind::Result),
            "document" | "doc" => Ok(LinkKind::Document),
            _ => Err(format!(
                "Invalid link kind: {}. Use jira-ticket, result, or document",
                s
            )),
        }
    }
}

impl rusqlite::ToSql for LinkKind {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
    }
}

impl rusqlite::types::FromSql for LinkKind {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
    }
}

/// Type of record that owns a link; derived from the owner id's prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Activity,
    ComponentActivity,
    ComponentFeature,
}

impl OwnerKind {
    pub fn from_prefix(prefix: EntityPrefix) -> Option<Self> {
        match prefix {
            EntityPrefix::Act => Some(OwnerKind::Activity),
            EntityPrefix::Cact => Some(OwnerKind::ComponentActivity),
            EntityPrefix::Cfeat => Some(OwnerKind::ComponentFeature),
            _ => None,
        }
    }

    pub fn prefix(&self) -> EntityPrefix {
        match self {
            OwnerKind::Activity => EntityPrefix::Act,
            OwnerKind::ComponentActivity => EntityPrefix::Cact,
            OwnerKind::ComponentFeature => EntityPrefix::Cfeat,
        }
    }

    /// Column in the links table holding this owner's foreign key
    pub(crate) fn column(&self) -> &'static str {
        match self {
            OwnerKind::Activity => "activity_id",
            OwnerKind::ComponentActivity => "component_activity_id",
            OwnerKind::ComponentFeature => "component_feature_id",
        }
    }
}

/// A URL with a display name, optionally owned by one work item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: EntityId,

    pub kind: LinkKind,

    pub url: String,

    pub name: String,

    /// Owning activity, component activity or component feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityId>,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Link {
    const PREFIX: EntityPrefix = EntityPrefix::Lnk;

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
        validation::name("link", "name", &self.name, 255)?;
        validation::required("link", "url", &self.url)?;
        validation::optional_url("link", "url", &self.url)?;
        if let Some(owner) = &self.owner {
            let allowed = OwnerKind::from_prefix(owner.prefix())
                .map(|kind| self.kind.allowed_owners().contains(&kind))
                .unwrap_or(false);
            if !allowed {
                return Err(StoreError::validation(
                    "link",
                    "owner",
                    format!("a {} link cannot be attached to {}", self.kind, owner),
                ));
            }
        }
        Ok(())
    }
}

impl Link {
    pub fn new(kind: LinkKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Lnk),
            kind,
            url: url.into(),
            name: name.into(),
            owner: None,
            created: now,
            modified: now,
        }
    }

    pub fn owned_by(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn owner_kind(&self) -> Option<OwnerKind> {
        self.owner
            .as_ref()
            .and_then(|id| OwnerKind::from_prefix(id.prefix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_may_belong_to_component_feature() {
        let link = Link::new(LinkKind::Document, "Design doc", "https://docs.example.com/d/1")
            .owned_by(EntityId::new(EntityPrefix::Cfeat));
        assert!(link.validate().is_ok());
        assert_eq!(link.owner_kind(), Some(OwnerKind::ComponentFeature));
    }

    #[test]
    fn test_result_cannot_belong_to_component_feature() {
        let link = Link::new(LinkKind::Result, "Scan", "https://ci.example.com/run/9")
            .owned_by(EntityId::new(EntityPrefix::Cfeat));
        assert_eq!(link.validate().unwrap_err().field(), Some("owner"));
    }

    #[test]
    fn test_link_url_required() {
        let link = Link::new(LinkKind::JiraTicket, "SEC-1", "");
        assert_eq!(link.validate().unwrap_err().field(), Some("url"));
    }

    #[test]
    fn test_link_kind_parse_aliases() {
        assert_eq!("jira-ticket".parse::<LinkKind>().unwrap(), LinkKind::JiraTicket);
        assert_eq!("doc".parse::<LinkKind>().unwrap(), LinkKind::Document);
    }
}
