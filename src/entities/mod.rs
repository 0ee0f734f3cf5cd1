//! Entity type definitions
//!
//! **Catalog:**
//! - [`Software`] - Products that own components
//! - [`Component`] - Deliverable parts of a product, with contacts and milestones
//! - [`Feature`] / [`FeatureCategory`] - Capabilities and their grouping
//! - [`Threat`] - Catalogued threats
//! - [`Contact`] - People referenced by components
//!
//! **Compliance:**
//! - [`Standard`] / [`Requirement`] - Standards and their obligations
//! - [`Activity`] - Assessment templates that satisfy requirements
//!
//! **Tracking:**
//! - [`ComponentFeature`] - A feature's implementation status in one component
//! - [`ComponentActivity`] - One execution of an activity against a component
//! - [`Campaign`] - Cross-cutting grouping of features and activity executions
//! - [`Link`] - Jira tickets, results and documents attached to work items

pub mod activity;
pub mod association;
pub mod campaign;
pub mod component;
pub mod component_feature;
pub mod contact;
pub mod feature;
pub mod link;
pub mod software;
pub mod standard;
pub mod threat;

pub use activity::{Activity, ComponentActivity, Schedule};
pub use association::{Association, Relation};
pub use campaign::Campaign;
pub use component::{Component, ComponentContacts, Milestones};
pub use component_feature::ComponentFeature;
pub use contact::{Contact, ContactKind};
pub use feature::{Feature, FeatureCategory};
pub use link::{Link, LinkKind, OwnerKind};
pub use software::Software;
pub use standard::{Requirement, Standard};
pub use threat::Threat;
