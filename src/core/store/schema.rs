//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{Store, SCHEMA_VERSION};
use crate::core::error::StoreError;

impl Store {
    /// Create all tables and indexes if they do not exist yet
    pub(super) fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS software (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                kind TEXT NOT NULL,
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS components (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                repo_url TEXT NOT NULL DEFAULT '',
                software_id TEXT NOT NULL REFERENCES software(id) ON DELETE CASCADE,
                engineering_contact_id TEXT REFERENCES contacts(id) ON DELETE SET NULL,
                business_contact_id TEXT REFERENCES contacts(id) ON DELETE SET NULL,
                psrd_contact_id TEXT REFERENCES contacts(id) ON DELETE SET NULL,
                ticket_url TEXT NOT NULL DEFAULT '',
                dev_preview_date TEXT,
                tech_preview_date TEXT,
                ga_date TEXT,
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_components_software ON components(software_id);

            CREATE TABLE IF NOT EXISTS feature_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS features (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                category_id TEXT REFERENCES feature_categories(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_features_category ON features(category_id);

            CREATE TABLE IF NOT EXISTS threats (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS component_features (
                id TEXT PRIMARY KEY,
                component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
                feature_id TEXT NOT NULL REFERENCES features(id) ON DELETE CASCADE,
                description TEXT NOT NULL DEFAULT '',
                priority INTEGER NOT NULL DEFAULT 2 CHECK (priority IN (1, 2, 3)),
                status INTEGER NOT NULL DEFAULT 1 CHECK (status IN (1, 2, 3)),
                ticket_url TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                UNIQUE (component_id, feature_id)
            );
            CREATE INDEX IF NOT EXISTS idx_component_features_feature ON component_features(feature_id);

            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS component_activities (
                id TEXT PRIMARY KEY,
                component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
                activity_id TEXT NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
                estimated_completion_date TEXT,
                execution_start_date TEXT,
                execution_end_date TEXT,
                status INTEGER NOT NULL DEFAULT 1 CHECK (status IN (1, 2, 3)),
                component_version TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                UNIQUE (component_id, activity_id)
            );
            CREATE INDEX IF NOT EXISTS idx_component_activities_activity ON component_activities(activity_id);

            CREATE TABLE IF NOT EXISTS campaigns (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                status INTEGER NOT NULL DEFAULT 1 CHECK (status IN (1, 2, 3)),
                due_date TEXT,
                ticket_url TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS standards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                code TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS requirements (
                id TEXT PRIMARY KEY,
                standard_id TEXT NOT NULL REFERENCES standards(id) ON DELETE CASCADE,
                definition TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                code TEXT NOT NULL DEFAULT '',
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                UNIQUE (standard_id, definition)
            );

            -- Jira tickets, results and documents; at most one owner column is set
            CREATE TABLE IF NOT EXISTS links (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL CHECK (kind IN ('jira_ticket', 'result', 'document')),
                url TEXT NOT NULL,
                name TEXT NOT NULL,
                activity_id TEXT REFERENCES activities(id) ON DELETE CASCADE,
                component_activity_id TEXT REFERENCES component_activities(id) ON DELETE CASCADE,
                component_feature_id TEXT REFERENCES component_features(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                CHECK ((activity_id IS NOT NULL) + (component_activity_id IS NOT NULL)
                       + (component_feature_id IS NOT NULL) <= 1)
            );
            CREATE INDEX IF NOT EXISTS idx_links_activity ON links(activity_id);
            CREATE INDEX IF NOT EXISTS idx_links_component_activity ON links(component_activity_id);
            CREATE INDEX IF NOT EXISTS idx_links_component_feature ON links(component_feature_id);

            -- Join tables
            CREATE TABLE IF NOT EXISTS campaign_component_features (
                campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                component_feature_id TEXT NOT NULL REFERENCES component_features(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                PRIMARY KEY (campaign_id, component_feature_id)
            );
            CREATE INDEX IF NOT EXISTS idx_ccf_component_feature ON campaign_component_features(component_feature_id);

            CREATE TABLE IF NOT EXISTS campaign_component_activities (
                campaign_id TEXT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
                component_activity_id TEXT NOT NULL REFERENCES component_activities(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                PRIMARY KEY (campaign_id, component_activity_id)
            );
            CREATE INDEX IF NOT EXISTS idx_cca_component_activity ON campaign_component_activities(component_activity_id);

            CREATE TABLE IF NOT EXISTS activity_requirements (
                activity_id TEXT NOT NULL REFERENCES activities(id) ON DELETE CASCADE,
                requirement_id TEXT NOT NULL REFERENCES requirements(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                PRIMARY KEY (activity_id, requirement_id)
            );
            CREATE INDEX IF NOT EXISTS idx_ar_requirement ON activity_requirements(requirement_id);

            CREATE TABLE IF NOT EXISTS feature_requirements (
                feature_id TEXT NOT NULL REFERENCES features(id) ON DELETE CASCADE,
                requirement_id TEXT NOT NULL REFERENCES requirements(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                PRIMARY KEY (feature_id, requirement_id)
            );
            CREATE INDEX IF NOT EXISTS idx_fr_requirement ON feature_requirements(requirement_id);

            CREATE TABLE IF NOT EXISTS component_standards (
                component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
                standard_id TEXT NOT NULL REFERENCES standards(id) ON DELETE CASCADE,
                created TEXT NOT NULL,
                modified TEXT NOT NULL,
                PRIMARY KEY (component_id, standard_id)
            );
            CREATE INDEX IF NOT EXISTS idx_cs_standard ON component_standards(standard_id);
            "#,
        )?;

        let current: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .optional()?
            .flatten();

        match current {
            Some(version) if version > SCHEMA_VERSION => Err(StoreError::validation(
                "database",
                "schema_version",
                format!(
                    "database schema version {} is newer than supported version {}",
                    version, SCHEMA_VERSION
                ),
            )),
            Some(version) if version == SCHEMA_VERSION => Ok(()),
            _ => {
                self.conn.execute(
                    "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
                Ok(())
            }
        }
    }
}
