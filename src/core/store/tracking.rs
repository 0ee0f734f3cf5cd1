//! Component features, component activities and campaigns

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_exists, expect_affected, expect_prefix, map_pair_unique, map_unique, Store};
use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Campaign, ComponentActivity, ComponentFeature, Schedule};

// =========================================================================
// Component features
// =========================================================================

const COMPONENT_FEATURE_SELECT: &str = r#"
    SELECT cf.id, cf.component_id, cf.feature_id, c.name, f.name, cf.description,
           cf.priority, cf.status, cf.ticket_url, cf.created, cf.modified
    FROM component_features cf
    JOIN components c ON c.id = cf.component_id
    JOIN features f ON f.id = cf.feature_id"#;

const COMPONENT_FEATURE_ORDER: &str = "ORDER BY c.name, f.name, cf.rowid";

fn component_feature_from_row(row: &Row<'_>) -> rusqlite::Result<ComponentFeature> {
    Ok(ComponentFeature {
        id: row.get(0)?,
        component: row.get(1)?,
        feature: row.get(2)?,
        component_name: row.get(3)?,
        feature_name: row.get(4)?,
        description: row.get(5)?,
        priority: row.get(6)?,
        status: row.get(7)?,
        ticket_url: row.get(8)?,
        created: row.get(9)?,
        modified: row.get(10)?,
    })
}

pub(crate) fn fetch_component_feature(
    conn: &Connection,
    id: &EntityId,
) -> Result<ComponentFeature, StoreError> {
    expect_prefix("component feature", "id", id, EntityPrefix::Cfeat)?;
    conn.query_row(
        &format!("{} WHERE cf.id = ?1", COMPONENT_FEATURE_SELECT),
        params![id],
        component_feature_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("component feature", id))
}

/// Component features linked to a campaign
pub(crate) fn component_features_in_campaign(
    conn: &Connection,
    campaign: &EntityId,
) -> Result<Vec<ComponentFeature>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{} JOIN campaign_component_features ccf ON ccf.component_feature_id = cf.id \
         WHERE ccf.campaign_id = ?1 {}",
        COMPONENT_FEATURE_SELECT, COMPONENT_FEATURE_ORDER
    ))?;
    let rows = stmt.query_map(params![campaign], component_feature_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Store {
    /// Attach a feature to a component; a second record for the same pair is a duplicate
    pub fn create_component_feature(
        &mut self,
        record: &ComponentFeature,
    ) -> Result<ComponentFeature, StoreError> {
        record.validate()?;
        let record = self.write(|tx| {
            ensure_exists(tx, &record.component)?;
            ensure_exists(tx, &record.feature)?;
            tx.execute(
                r#"INSERT INTO component_features
                   (id, component_id, feature_id, description, priority, status, ticket_url, created, modified)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                params![
                    record.id,
                    record.component,
                    record.feature,
                    record.description,
                    record.priority,
                    record.status,
                    record.ticket_url.trim(),
                    record.created,
                    record.modified
                ],
            )
            .map_err(|e| map_pair_unique(e, "component-feature", &record.component, &record.feature))?;
            fetch_component_feature(tx, &record.id)
        })?;
        tracing::debug!(id = %record.id, component = %record.component, feature = %record.feature, "created component feature");
        Ok(record)
    }

    pub fn get_component_feature(&self, id: &EntityId) -> Result<ComponentFeature, StoreError> {
        fetch_component_feature(&self.conn, id)
    }

    /// Component features ordered by (component name, feature name), optionally scoped
    pub fn list_component_features(
        &self,
        component: Option<&EntityId>,
        feature: Option<&EntityId>,
    ) -> Result<Vec<ComponentFeature>, StoreError> {
        if let Some(id) = component {
            expect_prefix("component", "id", id, EntityPrefix::Cmp)?;
            ensure_exists(&self.conn, id)?;
        }
        if let Some(id) = feature {
            expect_prefix("feature", "id", id, EntityPrefix::Feat)?;
            ensure_exists(&self.conn, id)?;
        }
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE (?1 IS NULL OR cf.component_id = ?1) AND (?2 IS NULL OR cf.feature_id = ?2) {}",
            COMPONENT_FEATURE_SELECT, COMPONENT_FEATURE_ORDER
        ))?;
        let rows = stmt.query_map(params![component, feature], component_feature_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_component_feature(
        &mut self,
        record: &ComponentFeature,
    ) -> Result<ComponentFeature, StoreError> {
        record.validate()?;
        self.write(|tx| save_component_feature(tx, record))
    }

    /// Delete a component feature with its documents and campaign links
    pub fn delete_component_feature(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("component feature", "id", id, EntityPrefix::Cfeat)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM component_features WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted component feature");
        Ok(())
    }
}

pub(crate) fn save_component_feature(
    conn: &Connection,
    record: &ComponentFeature,
) -> Result<ComponentFeature, StoreError> {
    ensure_exists(conn, &record.component)?;
    ensure_exists(conn, &record.feature)?;
    let affected = conn
        .execute(
            r#"UPDATE component_features SET component_id = ?2, feature_id = ?3, description = ?4,
                  priority = ?5, status = ?6, ticket_url = ?7, modified = ?8
               WHERE id = ?1"#,
            params![
                record.id,
                record.component,
                record.feature,
                record.description,
                record.priority,
                record.status,
                record.ticket_url.trim(),
                Utc::now()
            ],
        )
        .map_err(|e| map_pair_unique(e, "component-feature", &record.component, &record.feature))?;
    expect_affected(affected, &record.id)?;
    tracing::debug!(id = %record.id, status = %record.status, "updated component feature");
    fetch_component_feature(conn, &record.id)
}

// =========================================================================
// Component activities
// =========================================================================

const COMPONENT_ACTIVITY_SELECT: &str = r#"
    SELECT ca.id, ca.component_id, ca.activity_id, c.name, a.name,
           ca.estimated_completion_date, ca.execution_start_date, ca.execution_end_date,
           ca.status, ca.component_version, ca.created, ca.modified
    FROM component_activities ca
    JOIN components c ON c.id = ca.component_id
    JOIN activities a ON a.id = ca.activity_id"#;

const COMPONENT_ACTIVITY_ORDER: &str = "ORDER BY c.name, a.name, ca.rowid";

pub(crate) fn component_activity_from_row(row: &Row<'_>) -> rusqlite::Result<ComponentActivity> {
    Ok(ComponentActivity {
        id: row.get(0)?,
        component: row.get(1)?,
        activity: row.get(2)?,
        component_name: row.get(3)?,
        activity_name: row.get(4)?,
        schedule: Schedule {
            estimated_completion: row.get(5)?,
            execution_start: row.get(6)?,
            execution_end: row.get(7)?,
        },
        status: row.get(8)?,
        component_version: row.get(9)?,
        created: row.get(10)?,
        modified: row.get(11)?,
    })
}

pub(crate) fn fetch_component_activity(
    conn: &Connection,
    id: &EntityId,
) -> Result<ComponentActivity, StoreError> {
    expect_prefix("component activity", "id", id, EntityPrefix::Cact)?;
    conn.query_row(
        &format!("{} WHERE ca.id = ?1", COMPONENT_ACTIVITY_SELECT),
        params![id],
        component_activity_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("component activity", id))
}

/// Component activities linked to a campaign
pub(crate) fn component_activities_in_campaign(
    conn: &Connection,
    campaign: &EntityId,
) -> Result<Vec<ComponentActivity>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{} JOIN campaign_component_activities cca ON cca.component_activity_id = ca.id \
         WHERE cca.campaign_id = ?1 {}",
        COMPONENT_ACTIVITY_SELECT, COMPONENT_ACTIVITY_ORDER
    ))?;
    let rows = stmt.query_map(params![campaign], component_activity_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Executions for one component whose activity satisfies the requirement,
/// ordered by activity name
pub(crate) fn component_activities_for_requirement(
    conn: &Connection,
    component: &EntityId,
    requirement: &EntityId,
) -> Result<Vec<ComponentActivity>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{} JOIN activity_requirements ar ON ar.activity_id = ca.activity_id \
         WHERE ca.component_id = ?1 AND ar.requirement_id = ?2 \
         ORDER BY a.name, ca.rowid",
        COMPONENT_ACTIVITY_SELECT
    ))?;
    let rows = stmt.query_map(params![component, requirement], component_activity_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Store {
    /// Record an execution of an activity against a component; one per pair
    pub fn create_component_activity(
        &mut self,
        record: &ComponentActivity,
    ) -> Result<ComponentActivity, StoreError> {
        record.validate()?;
        let record = self.write(|tx| {
            ensure_exists(tx, &record.component)?;
            ensure_exists(tx, &record.activity)?;
            tx.execute(
                r#"INSERT INTO component_activities
                   (id, component_id, activity_id, estimated_completion_date, execution_start_date,
                    execution_end_date, status, component_version, created, modified)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                params![
                    record.id,
                    record.component,
                    record.activity,
                    record.schedule.estimated_completion,
                    record.schedule.execution_start,
                    record.schedule.execution_end,
                    record.status,
                    record.component_version.trim(),
                    record.created,
                    record.modified
                ],
            )
            .map_err(|e| {
                map_pair_unique(e, "component-activity", &record.component, &record.activity)
            })?;
            fetch_component_activity(tx, &record.id)
        })?;
        tracing::debug!(id = %record.id, component = %record.component, activity = %record.activity, "created component activity");
        Ok(record)
    }

    pub fn get_component_activity(&self, id: &EntityId) -> Result<ComponentActivity, StoreError> {
        fetch_component_activity(&self.conn, id)
    }

    /// Component activities ordered by (component name, activity name), optionally scoped
    pub fn list_component_activities(
        &self,
        component: Option<&EntityId>,
        activity: Option<&EntityId>,
    ) -> Result<Vec<ComponentActivity>, StoreError> {
        if let Some(id) = component {
            expect_prefix("component", "id", id, EntityPrefix::Cmp)?;
            ensure_exists(&self.conn, id)?;
        }
        if let Some(id) = activity {
            expect_prefix("activity", "id", id, EntityPrefix::Act)?;
            ensure_exists(&self.conn, id)?;
        }
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE (?1 IS NULL OR ca.component_id = ?1) AND (?2 IS NULL OR ca.activity_id = ?2) {}",
            COMPONENT_ACTIVITY_SELECT, COMPONENT_ACTIVITY_ORDER
        ))?;
        let rows = stmt.query_map(params![component, activity], component_activity_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_component_activity(
        &mut self,
        record: &ComponentActivity,
    ) -> Result<ComponentActivity, StoreError> {
        record.validate()?;
        self.write(|tx| save_component_activity(tx, record))
    }

    /// Delete an execution with its tickets, results, documents and campaign links
    pub fn delete_component_activity(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("component activity", "id", id, EntityPrefix::Cact)?;
        self.write(|tx| {
            let affected =
                tx.execute("DELETE FROM component_activities WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted component activity");
        Ok(())
    }
}

pub(crate) fn save_component_activity(
    conn: &Connection,
    record: &ComponentActivity,
) -> Result<ComponentActivity, StoreError> {
    ensure_exists(conn, &record.component)?;
    ensure_exists(conn, &record.activity)?;
    let affected = conn
        .execute(
            r#"UPDATE component_activities SET component_id = ?2, activity_id = ?3,
                  estimated_completion_date = ?4, execution_start_date = ?5,
                  execution_end_date = ?6, status = ?7, component_version = ?8, modified = ?9
               WHERE id = ?1"#,
            params![
                record.id,
                record.component,
                record.activity,
                record.schedule.estimated_completion,
                record.schedule.execution_start,
                record.schedule.execution_end,
                record.status,
                record.component_version.trim(),
                Utc::now()
            ],
        )
        .map_err(|e| map_pair_unique(e, "component-activity", &record.component, &record.activity))?;
    expect_affected(affected, &record.id)?;
    tracing::debug!(id = %record.id, status = %record.status, "updated component activity");
    fetch_component_activity(conn, &record.id)
}

// =========================================================================
// Campaigns
// =========================================================================

const CAMPAIGN_COLUMNS: &str =
    "id, name, description, status, due_date, ticket_url, created, modified";

pub(crate) fn campaign_from_row(row: &Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        due_date: row.get(4)?,
        ticket_url: row.get(5)?,
        created: row.get(6)?,
        modified: row.get(7)?,
    })
}

pub(crate) fn fetch_campaign(conn: &Connection, id: &EntityId) -> Result<Campaign, StoreError> {
    expect_prefix("campaign", "id", id, EntityPrefix::Camp)?;
    conn.query_row(
        &format!("SELECT {} FROM campaigns WHERE id = ?1", CAMPAIGN_COLUMNS),
        params![id],
        campaign_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("campaign", id))
}

pub(crate) fn all_campaigns(conn: &Connection) -> Result<Vec<Campaign>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM campaigns ORDER BY name, rowid",
        CAMPAIGN_COLUMNS
    ))?;
    let rows = stmt.query_map([], campaign_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Store {
    pub fn create_campaign(&mut self, campaign: &Campaign) -> Result<Campaign, StoreError> {
        campaign.validate()?;
        let campaign = self.write(|tx| {
            tx.execute(
                &format!(
                    "INSERT INTO campaigns ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    CAMPAIGN_COLUMNS
                ),
                params![
                    campaign.id,
                    campaign.name.trim(),
                    campaign.description,
                    campaign.status,
                    campaign.due_date,
                    campaign.ticket_url.trim(),
                    campaign.created,
                    campaign.modified
                ],
            )
            .map_err(|e| map_unique(e, "campaign"))?;
            fetch_campaign(tx, &campaign.id)
        })?;
        tracing::debug!(id = %campaign.id, name = %campaign.name, "created campaign");
        Ok(campaign)
    }

    pub fn get_campaign(&self, id: &EntityId) -> Result<Campaign, StoreError> {
        fetch_campaign(&self.conn, id)
    }

    /// All campaigns, ordered by name
    pub fn list_campaigns(&self) -> Result<Vec<Campaign>, StoreError> {
        all_campaigns(&self.conn)
    }

    pub fn update_campaign(&mut self, campaign: &Campaign) -> Result<Campaign, StoreError> {
        campaign.validate()?;
        self.write(|tx| save_campaign(tx, campaign))
    }

    /// Delete a campaign; linked work items are kept, only the links go
    pub fn delete_campaign(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("campaign", "id", id, EntityPrefix::Camp)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM campaigns WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted campaign");
        Ok(())
    }

    /// Component features that belong to a campaign
    pub fn campaign_component_features(
        &self,
        campaign: &EntityId,
    ) -> Result<Vec<ComponentFeature>, StoreError> {
        fetch_campaign(&self.conn, campaign)?;
        component_features_in_campaign(&self.conn, campaign)
    }

    /// Component activities that belong to a campaign
    pub fn campaign_component_activities(
        &self,
        campaign: &EntityId,
    ) -> Result<Vec<ComponentActivity>, StoreError> {
        fetch_campaign(&self.conn, campaign)?;
        component_activities_in_campaign(&self.conn, campaign)
    }

    /// Campaigns a component feature or component activity belongs to, by name
    pub fn campaigns_of(&self, member: &EntityId) -> Result<Vec<Campaign>, StoreError> {
        let (table, column) = match member.prefix() {
            EntityPrefix::Cfeat => ("campaign_component_features", "component_feature_id"),
            EntityPrefix::Cact => ("campaign_component_activities", "component_activity_id"),
            _ => {
                return Err(StoreError::validation(
                    "campaign",
                    "member",
                    format!(
                        "expected a component feature or component activity id, got {}",
                        member
                    ),
                ))
            }
        };
        ensure_exists(&self.conn, member)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT c.id, c.name, c.description, c.status, c.due_date, c.ticket_url,
                      c.created, c.modified
               FROM campaigns c
               JOIN {table} j ON j.campaign_id = c.id
               WHERE j.{column} = ?1
               ORDER BY c.name, c.rowid"#,
        ))?;
        let rows = stmt.query_map(params![member], campaign_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

pub(crate) fn save_campaign(conn: &Connection, campaign: &Campaign) -> Result<Campaign, StoreError> {
    let affected = conn
        .execute(
            r#"UPDATE campaigns SET name = ?2, description = ?3, status = ?4, due_date = ?5,
                  ticket_url = ?6, modified = ?7
               WHERE id = ?1"#,
            params![
                campaign.id,
                campaign.name.trim(),
                campaign.description,
                campaign.status,
                campaign.due_date,
                campaign.ticket_url.trim(),
                Utc::now()
            ],
        )
        .map_err(|e| map_unique(e, "campaign"))?;
    expect_affected(affected, &campaign.id)?;
    tracing::debug!(id = %campaign.id, status = %campaign.status, "updated campaign");
    fetch_campaign(conn, &campaign.id)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::core::entity::{Priority, Status};

    #[test]
    fn test_duplicate_component_feature_pair_rejected() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let feat = fixtures::feature(&mut store, "FIPS");
        fixtures::component_feature(&mut store, &cmp.id, &feat.id);

        let err = store
            .create_component_feature(&ComponentFeature::new(cmp.id.clone(), feat.id.clone()))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.list_component_features(None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_component_activity_pair_rejected() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let act = fixtures::activity(&mut store, "Code review");
        fixtures::component_activity(&mut store, &cmp.id, &act.id);

        let err = store
            .create_component_activity(&ComponentActivity::new(cmp.id.clone(), act.id.clone()))
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_component_features_ordered_by_component_then_feature() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let zlib = fixtures::component(&mut store, &sw, "zlib");
        let bash = fixtures::component(&mut store, &sw, "bash");
        let fips = fixtures::feature(&mut store, "FIPS");
        let audit = fixtures::feature(&mut store, "Audit");
        fixtures::component_feature(&mut store, &zlib.id, &audit.id);
        fixtures::component_feature(&mut store, &bash.id, &fips.id);
        fixtures::component_feature(&mut store, &bash.id, &audit.id);

        let labels: Vec<String> = store
            .list_component_features(None, None)
            .unwrap()
            .iter()
            .map(|cf| cf.label())
            .collect();
        assert_eq!(labels, vec!["bash - Audit", "bash - FIPS", "zlib - Audit"]);

        let of_bash = store.list_component_features(Some(&bash.id), None).unwrap();
        assert_eq!(of_bash.len(), 2);
        let of_audit = store.list_component_features(None, Some(&audit.id)).unwrap();
        assert_eq!(of_audit.len(), 2);
    }

    #[test]
    fn test_component_feature_defaults_persisted() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let feat = fixtures::feature(&mut store, "FIPS");
        let cf = fixtures::component_feature(&mut store, &cmp.id, &feat.id);

        assert_eq!(cf.priority, Priority::Medium);
        assert_eq!(cf.status, Status::Todo);
        assert_eq!(cf.component_name, "openssl");
        assert_eq!(cf.feature_name, "FIPS");
    }

    #[test]
    fn test_component_activity_update_roundtrips_schedule() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let act = fixtures::activity(&mut store, "Pen test");
        let mut ca = fixtures::component_activity(&mut store, &cmp.id, &act.id);

        ca.schedule.execution_start = chrono::NaiveDate::from_ymd_opt(2024, 3, 1);
        ca.schedule.execution_end = chrono::NaiveDate::from_ymd_opt(2024, 3, 15);
        ca.status = Status::Done;
        ca.component_version = "3.0.7".to_string();
        let updated = store.update_component_activity(&ca).unwrap();

        assert_eq!(updated.schedule, ca.schedule);
        assert_eq!(updated.status, Status::Done);
        assert_eq!(updated.component_version, "3.0.7");
        assert_eq!(updated.activity_name, "Pen test");
    }

    #[test]
    fn test_duplicate_campaign_name_rejected() {
        let mut store = fixtures::store();
        fixtures::campaign(&mut store, "Q3 hardening");
        let err = store
            .create_campaign(&Campaign::new("Q3 hardening"))
            .unwrap_err();
        assert_eq!(err.field(), Some("name"));
        assert_eq!(store.list_campaigns().unwrap().len(), 1);
    }

    #[test]
    fn test_campaigns_of_rejects_other_types() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let err = store.campaigns_of(&sw.id).unwrap_err();
        assert!(err.is_validation());
    }
}
