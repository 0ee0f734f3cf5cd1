//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use std::io::IsTerminal;

use chrono::NaiveDate;
use clap::ValueEnum;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::store::Store;
use crate::core::Config;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render an optional value as "-" when absent
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Parse an id and require a specific entity type
pub fn parse_id(s: &str, expected: EntityPrefix) -> Result<EntityId> {
    let id: EntityId = s.parse().map_err(StoreError::from)?;
    if id.prefix() != expected {
        return Err(miette::miette!(
            "expected a {} id ({}-...), got {}",
            expected.entity_name(),
            expected,
            id
        ));
    }
    Ok(id)
}

/// Parse an id of any entity type
pub fn parse_any_id(s: &str) -> Result<EntityId> {
    Ok(s.parse::<EntityId>().map_err(StoreError::from)?)
}

pub fn parse_ids(values: &[String], expected: EntityPrefix) -> Result<Vec<EntityId>> {
    values.iter().map(|v| parse_id(v, expected)).collect()
}

pub fn parse_opt_id(value: Option<&str>, expected: EntityPrefix) -> Result<Option<EntityId>> {
    value.map(|v| parse_id(v, expected)).transpose()
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| miette::miette!("invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

pub fn parse_opt_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(parse_date).transpose()
}

fn discover_project(global: &GlobalOpts) -> std::result::Result<Project, crate::core::ProjectError> {
    match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
}

/// Configuration for the selected project
pub fn load_config(global: &GlobalOpts) -> Config {
    Config::load_for(discover_project(global).ok().as_ref())
}

/// Open the store of the selected project.
///
/// Outside a project, a configured database path (e.g. `CTRACK_DATABASE`) is used directly.
pub fn open_store(global: &GlobalOpts) -> Result<Store> {
    match discover_project(global) {
        Ok(project) => {
            let config = Config::load_for(Some(&project));
            let path = project.database_path(config.database.as_deref());
            Ok(Store::open(path)?)
        }
        Err(e) => match Config::load_for(None).database {
            Some(path) => Ok(Store::open(path)?),
            None => Err(miette::miette!("{}", e)),
        },
    }
}

/// Resolve `auto` through the configured default, then to `fallback`
pub fn resolve_format(global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    load_config(global)
        .default_format
        .and_then(|f| OutputFormat::from_str(&f, true).ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(fallback)
}

/// Ask before a destructive action; `--yes` or a non-interactive stdin skips the prompt
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("ééééé", 4), "é...");
    }

    #[test]
    fn test_parse_id_checks_prefix() {
        let id = EntityId::new(EntityPrefix::Cmp);
        assert_eq!(parse_id(&id.to_string(), EntityPrefix::Cmp).unwrap(), id);
        assert!(parse_id(&id.to_string(), EntityPrefix::Sw).is_err());
        assert!(parse_id("garbage", EntityPrefix::Sw).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-06-30").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
        );
        assert!(parse_date("30/06/2024").is_err());
        assert_eq!(parse_opt_date(None).unwrap(), None);
    }
}
