//! CLI command implementations

pub mod utils;

pub mod activity;
pub mod assoc;
pub mod cact;
pub mod campaign;
pub mod category;
pub mod cfeat;
pub mod completions;
pub mod component;
pub mod contact;
pub mod feature;
pub mod init;
pub mod link;
pub mod report;
pub mod req;
pub mod software;
pub mod standard;
pub mod threat;
