//! ctrack: compliance and program tracking
//!
//! Records software products, their components, features and activity
//! executions, standards and requirements, and campaigns that group work
//! across components. Derives campaign status buckets, compliance matrices
//! and contact rollups from a local SQLite store.

pub mod cli;
pub mod core;
pub mod entities;
