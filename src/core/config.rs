//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Default log level when neither RUST_LOG nor config sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// ctrack configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database path override
    pub database: Option<PathBuf>,

    /// Tracing filter used when RUST_LOG is unset
    pub log_level: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_for(Project::discover().ok().as_ref())
    }

    /// Same as [`Config::load`] with an already discovered project
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/ctrack/config.yaml)
        if let Some(global) = Self::global_config_path().and_then(|p| Self::read_file(&p)) {
            config.merge(global);
        }

        // 3. Project config (.ctrack/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ctrack")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(database) = lookup("CTRACK_DATABASE").filter(|v| !v.is_empty()) {
            self.database = Some(PathBuf::from(database));
        }
        if let Some(level) = lookup("CTRACK_LOG").filter(|v| !v.is_empty()) {
            self.log_level = Some(level);
        }
        if let Some(format) = lookup("CTRACK_FORMAT").filter(|v| !v.is_empty()) {
            self.default_format = Some(format);
        }
    }

    /// Effective log filter
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_config_is_read() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.config_path(),
            "database: data/tracker.db\nlog_level: info\n",
        )
        .unwrap();

        let config = Config::load_for(Some(&project));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.database, Some(PathBuf::from("data/tracker.db")));
    }

    #[test]
    fn test_env_overrides_files() {
        let mut config = Config {
            log_level: Some("info".to_string()),
            ..Default::default()
        };
        config.apply_env(|key| match key {
            "CTRACK_LOG" => Some("debug".to_string()),
            "CTRACK_FORMAT" => Some("json".to_string()),
            _ => None,
        });
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert!(config.database.is_none());
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = Config {
            default_format: Some("yaml".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            log_level: Some("trace".to_string()),
            ..Default::default()
        });
        assert_eq!(base.default_format.as_deref(), Some("yaml"));
        assert_eq!(base.log_level(), "trace");
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(Config::default().log_level(), DEFAULT_LOG_LEVEL);
    }
}
