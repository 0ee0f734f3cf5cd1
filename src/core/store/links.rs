//! Jira tickets, results and documents

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_exists, expect_affected, expect_prefix, Store};
use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Link, LinkKind, OwnerKind};

const LINK_SELECT: &str = r#"
    SELECT id, kind, url, name,
           COALESCE(activity_id, component_activity_id, component_feature_id),
           created, modified
    FROM links"#;

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        id: row.get(0)?,
        kind: row.get(1)?,
        url: row.get(2)?,
        name: row.get(3)?,
        owner: row.get(4)?,
        created: row.get(5)?,
        modified: row.get(6)?,
    })
}

fn fetch_link(conn: &Connection, id: &EntityId) -> Result<Link, StoreError> {
    expect_prefix("link", "id", id, EntityPrefix::Lnk)?;
    conn.query_row(
        &format!("{} WHERE id = ?1", LINK_SELECT),
        params![id],
        link_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("link", id))
}

/// Split an owner into the three nullable owner columns
fn owner_columns(link: &Link) -> [Option<&EntityId>; 3] {
    let mut columns = [None, None, None];
    if let (Some(owner), Some(kind)) = (&link.owner, link.owner_kind()) {
        let slot = match kind {
            OwnerKind::Activity => 0,
            OwnerKind::ComponentActivity => 1,
            OwnerKind::ComponentFeature => 2,
        };
        columns[slot] = Some(owner);
    }
    columns
}

impl Store {
    pub fn create_link(&mut self, link: &Link) -> Result<Link, StoreError> {
        link.validate()?;
        let link = self.write(|tx| {
            if let Some(owner) = &link.owner {
                ensure_exists(tx, owner)?;
            }
            let [activity, component_activity, component_feature] = owner_columns(link);
            tx.execute(
                r#"INSERT INTO links (id, kind, url, name, activity_id, component_activity_id,
                                      component_feature_id, created, modified)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                params![
                    link.id,
                    link.kind,
                    link.url.trim(),
                    link.name.trim(),
                    activity,
                    component_activity,
                    component_feature,
                    link.created,
                    link.modified
                ],
            )?;
            fetch_link(tx, &link.id)
        })?;
        tracing::debug!(id = %link.id, kind = %link.kind, "created link");
        Ok(link)
    }

    pub fn get_link(&self, id: &EntityId) -> Result<Link, StoreError> {
        fetch_link(&self.conn, id)
    }

    /// Links ordered by name, optionally filtered by kind
    pub fn list_links(&self, kind: Option<LinkKind>) -> Result<Vec<Link>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE (?1 IS NULL OR kind = ?1) ORDER BY name, rowid",
            LINK_SELECT
        ))?;
        let rows = stmt.query_map(params![kind], link_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Links attached to an activity, component activity or component feature
    pub fn links_of(&self, owner: &EntityId) -> Result<Vec<Link>, StoreError> {
        let kind = OwnerKind::from_prefix(owner.prefix()).ok_or_else(|| {
            StoreError::validation(
                "link",
                "owner",
                format!("{} cannot own links", owner.prefix().entity_name()),
            )
        })?;
        ensure_exists(&self.conn, owner)?;
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE {} = ?1 ORDER BY name, rowid",
            LINK_SELECT,
            kind.column()
        ))?;
        let rows = stmt.query_map(params![owner], link_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_link(&mut self, link: &Link) -> Result<Link, StoreError> {
        link.validate()?;
        self.write(|tx| {
            if let Some(owner) = &link.owner {
                ensure_exists(tx, owner)?;
            }
            let [activity, component_activity, component_feature] = owner_columns(link);
            let affected = tx.execute(
                r#"UPDATE links SET kind = ?2, url = ?3, name = ?4, activity_id = ?5,
                      component_activity_id = ?6, component_feature_id = ?7, modified = ?8
                   WHERE id = ?1"#,
                params![
                    link.id,
                    link.kind,
                    link.url.trim(),
                    link.name.trim(),
                    activity,
                    component_activity,
                    component_feature,
                    Utc::now()
                ],
            )?;
            expect_affected(affected, &link.id)?;
            fetch_link(tx, &link.id)
        })
    }

    pub fn delete_link(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("link", "id", id, EntityPrefix::Lnk)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM links WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[test]
    fn test_links_of_owner_sorted_by_name() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let act = fixtures::activity(&mut store, "Pen test");
        let ca = fixtures::component_activity(&mut store, &cmp.id, &act.id);

        for name in ["Report", "JIRA-12"] {
            let link = Link::new(LinkKind::JiraTicket, name, "https://issues.example.com/x")
                .owned_by(ca.id.clone());
            store.create_link(&link).unwrap();
        }
        store
            .create_link(&Link::new(LinkKind::Document, "Unattached", "https://docs.example.com"))
            .unwrap();

        let names: Vec<String> = store
            .links_of(&ca.id)
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["JIRA-12", "Report"]);
        assert_eq!(store.list_links(None).unwrap().len(), 3);
        assert_eq!(store.list_links(Some(LinkKind::Document)).unwrap().len(), 1);
    }

    #[test]
    fn test_link_owner_roundtrips() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let feat = fixtures::feature(&mut store, "FIPS");
        let cf = fixtures::component_feature(&mut store, &cmp.id, &feat.id);

        let doc = store
            .create_link(
                &Link::new(LinkKind::Document, "Design", "https://docs.example.com/d")
                    .owned_by(cf.id.clone()),
            )
            .unwrap();
        assert_eq!(doc.owner.as_ref(), Some(&cf.id));
        assert_eq!(doc.owner_kind(), Some(OwnerKind::ComponentFeature));
    }

    #[test]
    fn test_link_to_missing_owner_is_not_found() {
        let mut store = fixtures::store();
        let link = Link::new(LinkKind::Result, "Scan", "https://ci.example.com/1")
            .owned_by(EntityId::new(EntityPrefix::Act));
        assert!(store.create_link(&link).unwrap_err().is_not_found());
    }

    #[test]
    fn test_deleting_owner_cascades_to_links() {
        let mut store = fixtures::store();
        let act = fixtures::activity(&mut store, "Threat model");
        store
            .create_link(
                &Link::new(LinkKind::Result, "Output", "https://ci.example.com/2")
                    .owned_by(act.id.clone()),
            )
            .unwrap();

        store.delete_activity(&act.id).unwrap();
        assert!(store.list_links(None).unwrap().is_empty());
    }
}
