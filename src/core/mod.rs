//! Core module - identity, shared enums, errors, configuration and the store

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod project;
pub mod store;
pub mod validation;

pub use config::Config;
pub use entity::{Entity, Priority, Status};
pub use error::StoreError;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use store::{
    Candidate, CampaignSummary, ComplianceMatrix, ComplianceRow, ContactRollup, StatusBuckets,
    Store,
};
