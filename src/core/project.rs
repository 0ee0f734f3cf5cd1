//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".ctrack";

/// Default database file inside the project directory
pub const DATABASE_FILE: &str = "tracker.db";

/// Represents a tracker project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .ctrack/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.ctrack/` with a default config at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_skeleton(root)
    }

    /// Initialize even if `.ctrack/` exists; the config is rewritten, the database kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_skeleton(root)
    }

    fn write_skeleton(root: PathBuf) -> Result<Self, ProjectError> {
        let dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# ctrack project configuration

# Database location, relative to the project root (default: .ctrack/tracker.db)
# database: ""

# Log level when RUST_LOG is unset (error, warn, info, debug, trace)
# log_level: warn

# Default output format (auto, table, json, yaml, csv, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .ctrack configuration directory
    pub fn ctrack_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Project-level config file
    pub fn config_path(&self) -> PathBuf {
        self.ctrack_dir().join("config.yaml")
    }

    /// Database path, honoring a configured override (relative paths resolve from the root)
    pub fn database_path(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.root.join(path),
            None => self.ctrack_dir().join(DATABASE_FILE),
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a ctrack project (searched from {searched_from:?}). Run 'ctrack init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("ctrack project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
