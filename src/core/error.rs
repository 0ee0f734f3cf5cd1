//! Store error taxonomy

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::IdParseError;

/// Errors returned at the store boundary
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    /// A field violates a type, length, uniqueness or required constraint
    #[error("invalid {entity} '{field}': {message}")]
    #[diagnostic(code(ctrack::validation))]
    Validation {
        entity: &'static str,
        field: String,
        message: String,
    },

    /// An operation references a record that does not exist
    #[error("{entity} not found: {id}")]
    #[diagnostic(
        code(ctrack::not_found),
        help("use the `list` subcommand to see existing ids")
    )]
    NotFound { entity: &'static str, id: String },

    /// An association would duplicate an existing unique pair
    #[error("{relation} link already exists: {owner} -> {target}")]
    #[diagnostic(code(ctrack::duplicate))]
    Duplicate {
        relation: String,
        owner: String,
        target: String,
    },

    #[error(transparent)]
    #[diagnostic(code(ctrack::invalid_id))]
    InvalidId(#[from] IdParseError),

    #[error("database error: {0}")]
    #[diagnostic(code(ctrack::database))]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code(ctrack::io))]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn validation(
        entity: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StoreError::Validation {
            entity,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Name of the offending field, if the error carries one
    pub fn field(&self) -> Option<&str> {
        match self {
            StoreError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}
