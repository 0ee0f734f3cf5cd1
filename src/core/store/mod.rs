//! SQLite-backed entity store
//!
//! This module provides the persistent store that:
//! - Holds every tracked entity and the join tables that relate them
//! - Enforces name/pair uniqueness and cascade deletes in the schema itself
//! - Runs every write inside one `BEGIN IMMEDIATE` transaction, so
//!   pre-checks and the write are atomic across connections
//! - Derives campaign status buckets, compliance matrices and contact
//!   rollups on every call (nothing is cached in memory)

mod aggregate;
mod associations;
mod catalog;
mod compliance;
mod links;
mod rollup;
mod schema;
mod tracking;
mod types;

pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};

use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// How long a writer waits for a competing transaction before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The entity store backed by SQLite
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL lets readers proceed while a writer holds the lock
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::configure(conn, Some(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn, None)
    }

    fn configure(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self { conn, path };
        store.init_schema()?;
        Ok(store)
    }

    /// Database file location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stored schema version
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let version = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get::<_, Option<i32>>(0)
            })?
            .unwrap_or(0);
        Ok(version)
    }

    /// Run `op` inside an immediate (write-locking) transaction.
    ///
    /// Any error rolls the whole transaction back.
    pub(crate) fn write<T, F>(&mut self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Table holding rows of the given entity type
pub(crate) fn table_for(prefix: EntityPrefix) -> &'static str {
    match prefix {
        EntityPrefix::Sw => "software",
        EntityPrefix::Cmp => "components",
        EntityPrefix::Feat => "features",
        EntityPrefix::Fcat => "feature_categories",
        EntityPrefix::Thr => "threats",
        EntityPrefix::Cfeat => "component_features",
        EntityPrefix::Act => "activities",
        EntityPrefix::Cact => "component_activities",
        EntityPrefix::Camp => "campaigns",
        EntityPrefix::Std => "standards",
        EntityPrefix::Req => "requirements",
        EntityPrefix::Con => "contacts",
        EntityPrefix::Lnk => "links",
    }
}

/// Reject an id of the wrong entity type
pub(crate) fn expect_prefix(
    entity: &'static str,
    field: &str,
    id: &EntityId,
    expected: EntityPrefix,
) -> Result<(), StoreError> {
    if id.prefix() == expected {
        Ok(())
    } else {
        Err(StoreError::validation(
            entity,
            field,
            format!("expected a {} id, got {}", expected.entity_name(), id),
        ))
    }
}

/// Fail with `NotFound` unless a row with this id exists
pub(crate) fn ensure_exists(conn: &Connection, id: &EntityId) -> Result<(), StoreError> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table_for(id.prefix()));
    let found: Option<i64> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::not_found(id.prefix().entity_name(), id)),
    }
}

/// Column names from a "UNIQUE constraint failed: t.a, t.b" error
fn unique_violation_columns(err: &rusqlite::Error) -> Option<Vec<String>> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == ErrorCode::ConstraintViolation => {
            let cols = msg.strip_prefix("UNIQUE constraint failed: ")?;
            Some(
                cols.split(',')
                    .map(|c| c.trim().rsplit('.').next().unwrap_or(c).to_string())
                    .collect(),
            )
        }
        _ => None,
    }
}

/// Map a uniqueness violation on an entity table to a field-level validation error
pub(crate) fn map_unique(err: rusqlite::Error, entity: &'static str) -> StoreError {
    match unique_violation_columns(&err) {
        Some(cols) => {
            // For composite keys the last column is the user-supplied one
            let field = cols
                .last()
                .map(|c| c.trim_end_matches("_id").to_string())
                .unwrap_or_default();
            let described: Vec<String> = cols
                .iter()
                .map(|c| c.trim_end_matches("_id").replace('_', " "))
                .collect();
            StoreError::validation(
                entity,
                field,
                format!("{} with this {} already exists", entity, described.join(" and ")),
            )
        }
        None => StoreError::Database(err),
    }
}

/// Map a uniqueness violation on a pair table to a duplicate-association error
pub(crate) fn map_pair_unique(
    err: rusqlite::Error,
    relation: &str,
    owner: &EntityId,
    target: &EntityId,
) -> StoreError {
    match unique_violation_columns(&err) {
        Some(_) => StoreError::Duplicate {
            relation: relation.to_string(),
            owner: owner.to_string(),
            target: target.to_string(),
        },
        None => StoreError::Database(err),
    }
}

/// Turn a zero-row UPDATE/DELETE into `NotFound`
pub(crate) fn expect_affected(affected: usize, id: &EntityId) -> Result<(), StoreError> {
    if affected == 0 {
        Err(StoreError::not_found(id.prefix().entity_name(), id))
    } else {
        Ok(())
    }
}

/// Shared setup for store tests
#[cfg(test)]
pub(crate) mod fixtures {
    use super::Store;
    use crate::core::identity::EntityId;
    use crate::entities::{
        Activity, Campaign, Component, ComponentActivity, ComponentFeature, Contact,
        ContactKind, Feature, Requirement, Software, Standard,
    };

    pub fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    pub fn software(store: &mut Store, name: &str) -> Software {
        store.create_software(&Software::new(name, "")).unwrap()
    }

    pub fn component(store: &mut Store, software: &Software, name: &str) -> Component {
        store
            .create_component(&Component::new(name, software.id.clone()))
            .unwrap()
    }

    pub fn feature(store: &mut Store, name: &str) -> Feature {
        store.create_feature(&Feature::new(name)).unwrap()
    }

    pub fn activity(store: &mut Store, name: &str) -> Activity {
        store.create_activity(&Activity::new(name, "")).unwrap()
    }

    pub fn campaign(store: &mut Store, name: &str) -> Campaign {
        store.create_campaign(&Campaign::new(name)).unwrap()
    }

    pub fn standard(store: &mut Store, name: &str, code: &str) -> Standard {
        store.create_standard(&Standard::new(name, code)).unwrap()
    }

    pub fn requirement(store: &mut Store, standard: &Standard, definition: &str) -> Requirement {
        store
            .create_requirement(&Requirement::new(standard.id.clone(), definition))
            .unwrap()
    }

    pub fn contact(store: &mut Store, name: &str, email: &str) -> Contact {
        store
            .create_contact(&Contact::new(name, email, ContactKind::Engineering))
            .unwrap()
    }

    pub fn component_feature(
        store: &mut Store,
        component: &EntityId,
        feature: &EntityId,
    ) -> ComponentFeature {
        store
            .create_component_feature(&ComponentFeature::new(component.clone(), feature.clone()))
            .unwrap()
    }

    pub fn component_activity(
        store: &mut Store,
        component: &EntityId,
        activity: &EntityId,
    ) -> ComponentActivity {
        store
            .create_component_activity(&ComponentActivity::new(
                component.clone(),
                activity.clone(),
            ))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_schema() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_reopen_keeps_schema_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("tracker.db");
        drop(Store::open(&path).unwrap());
        let store = Store::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    fn count(store: &Store, table: &str) -> i64 {
        store
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_deleting_software_leaves_no_orphans() {
        use crate::entities::{Link, LinkKind};

        let mut store = Store::open_in_memory().unwrap();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let feat = fixtures::feature(&mut store, "FIPS");
        let act = fixtures::activity(&mut store, "Pen test");
        let cf = fixtures::component_feature(&mut store, &cmp.id, &feat.id);
        let ca = fixtures::component_activity(&mut store, &cmp.id, &act.id);
        store
            .create_link(
                &Link::new(LinkKind::Document, "Design", "https://docs.example.com/d")
                    .owned_by(cf.id.clone()),
            )
            .unwrap();
        store
            .create_link(
                &Link::new(LinkKind::Result, "Report", "https://ci.example.com/r")
                    .owned_by(ca.id.clone()),
            )
            .unwrap();

        store.delete_software(&sw.id).unwrap();

        for table in ["components", "component_features", "component_activities", "links"] {
            assert_eq!(count(&store, table), 0, "{} not emptied", table);
        }
        // Templates are independent of software
        assert_eq!(count(&store, "features"), 1);
        assert_eq!(count(&store, "activities"), 1);
    }

    #[test]
    fn test_ensure_exists_reports_entity_type() {
        let store = Store::open_in_memory().unwrap();
        let missing = EntityId::new(EntityPrefix::Camp);
        let err = ensure_exists(&store.conn, &missing).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("campaign not found"));
    }
}
