//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Software product
    Sw,
    /// Component of a software product
    Cmp,
    /// Feature
    Feat,
    /// Feature category
    Fcat,
    /// Threat
    Thr,
    /// Feature implemented in a component
    Cfeat,
    /// Activity template
    Act,
    /// Activity executed against a component
    Cact,
    /// Campaign
    Camp,
    /// Standard
    Std,
    /// Requirement of a standard
    Req,
    /// Contact
    Con,
    /// Jira ticket / result / document link
    Lnk,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Sw => "SW",
            EntityPrefix::Cmp => "CMP",
            EntityPrefix::Feat => "FEAT",
            EntityPrefix::Fcat => "FCAT",
            EntityPrefix::Thr => "THR",
            EntityPrefix::Cfeat => "CFEAT",
            EntityPrefix::Act => "ACT",
            EntityPrefix::Cact => "CACT",
            EntityPrefix::Camp => "CAMP",
            EntityPrefix::Std => "STD",
            EntityPrefix::Req => "REQ",
            EntityPrefix::Con => "CON",
            EntityPrefix::Lnk => "LNK",
        }
    }

    /// Human-readable entity name, used in error messages
    pub fn entity_name(&self) -> &'static str {
        match self {
            EntityPrefix::Sw => "software",
            EntityPrefix::Cmp => "component",
            EntityPrefix::Feat => "feature",
            EntityPrefix::Fcat => "feature category",
            EntityPrefix::Thr => "threat",
            EntityPrefix::Cfeat => "component feature",
            EntityPrefix::Act => "activity",
            EntityPrefix::Cact => "component activity",
            EntityPrefix::Camp => "campaign",
            EntityPrefix::Std => "standard",
            EntityPrefix::Req => "requirement",
            EntityPrefix::Con => "contact",
            EntityPrefix::Lnk => "link",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Sw,
            EntityPrefix::Cmp,
            EntityPrefix::Feat,
            EntityPrefix::Fcat,
            EntityPrefix::Thr,
            EntityPrefix::Cfeat,
            EntityPrefix::Act,
            EntityPrefix::Cact,
            EntityPrefix::Camp,
            EntityPrefix::Std,
            EntityPrefix::Req,
            EntityPrefix::Con,
            EntityPrefix::Lnk,
        ]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SW" => Ok(EntityPrefix::Sw),
            "CMP" => Ok(EntityPrefix::Cmp),
            "FEAT" => Ok(EntityPrefix::Feat),
            "FCAT" => Ok(EntityPrefix::Fcat),
            "THR" => Ok(EntityPrefix::Thr),
            "CFEAT" => Ok(EntityPrefix::Cfeat),
            "ACT" => Ok(EntityPrefix::Act),
            "CACT" => Ok(EntityPrefix::Cact),
            "CAMP" => Ok(EntityPrefix::Camp),
            "STD" => Ok(EntityPrefix::Std),
            "REQ" => Ok(EntityPrefix::Req),
            "CON" => Ok(EntityPrefix::Con),
            "LNK" => Ok(EntityPrefix::Lnk),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Create an EntityId from a prefix and existing ULID
    pub fn from_parts(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    /// Get the entity prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl rusqlite::ToSql for EntityId {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::from(self.to_string()))
    }
}

impl rusqlite::types::FromSql for EntityId {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: SW, CMP, FEAT, FCAT, THR, CFEAT, ACT, CACT, CAMP, STD, REQ, CON, LNK)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
