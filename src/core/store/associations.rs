//! Many-to-many association management
//!
//! Every relation is edited with full-replace semantics: the owner's existing
//! join rows for that relation are cleared and exactly the submitted set is
//! re-inserted, inside one immediate transaction.

use std::collections::BTreeSet;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::compliance::{save_activity, save_requirement};
use super::tracking::{save_campaign, save_component_activity, save_component_feature};
use super::{ensure_exists, expect_prefix, map_pair_unique, table_for, Candidate, Store};
use crate::core::entity::{Entity, Status};
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{
    Activity, Association, Campaign, ComponentActivity, ComponentFeature, Relation, Requirement,
};

/// How to select, label and order rows of a target table aliased `t`
struct TargetView {
    from: String,
    label: &'static str,
    order: &'static str,
}

fn target_view(prefix: EntityPrefix) -> TargetView {
    match prefix {
        EntityPrefix::Cfeat => TargetView {
            from: "component_features t \
                   JOIN components c ON c.id = t.component_id \
                   JOIN features f ON f.id = t.feature_id"
                .to_string(),
            label: "c.name || ' - ' || f.name",
            order: "c.name, f.name, t.rowid",
        },
        EntityPrefix::Cact => TargetView {
            from: "component_activities t \
                   JOIN components c ON c.id = t.component_id \
                   JOIN activities a ON a.id = t.activity_id"
                .to_string(),
            label: "c.name || ' - ' || a.name",
            order: "c.name, a.name, t.rowid",
        },
        EntityPrefix::Req => TargetView {
            from: "requirements t".to_string(),
            label: "CASE WHEN t.code <> '' THEN rtrim(t.code || ' ' || t.name) \
                    WHEN t.name <> '' THEN t.name ELSE t.definition END",
            order: "t.created, t.rowid",
        },
        other => TargetView {
            from: format!("{} t", table_for(other)),
            label: "t.name",
            order: "t.name, t.rowid",
        },
    }
}

fn check_owner(conn: &Connection, relation: Relation, owner: &EntityId) -> Result<(), StoreError> {
    expect_prefix("association", "owner", owner, relation.owner())?;
    ensure_exists(conn, owner)
}

fn check_target(conn: &Connection, relation: Relation, target: &EntityId) -> Result<(), StoreError> {
    expect_prefix("association", "target", target, relation.target())?;
    ensure_exists(conn, target)
}

fn is_linked(
    conn: &Connection,
    relation: Relation,
    owner: &EntityId,
    target: &EntityId,
) -> Result<bool, StoreError> {
    let jt = relation.join_table();
    let found: Option<i64> = conn
        .query_row(
            &format!(
                "SELECT 1 FROM {} WHERE {} = ?1 AND {} = ?2",
                jt.table, jt.owner_column, jt.target_column
            ),
            params![owner, target],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Done campaigns cannot gain new members; existing links to them are kept
fn check_campaign_open(
    conn: &Connection,
    relation: Relation,
    owner: &EntityId,
    target: &EntityId,
) -> Result<(), StoreError> {
    if relation.target() != EntityPrefix::Camp {
        return Ok(());
    }
    let status: Status = conn.query_row(
        "SELECT status FROM campaigns WHERE id = ?1",
        params![target],
        |row| row.get(0),
    )?;
    if status.is_pending() || is_linked(conn, relation, owner, target)? {
        Ok(())
    } else {
        Err(StoreError::validation(
            "association",
            "target",
            format!("campaign {} is done and cannot take new work", target),
        ))
    }
}

/// Clear-then-reinsert inside an open transaction
pub(crate) fn replace_in(
    conn: &Connection,
    relation: Relation,
    owner: &EntityId,
    targets: &[EntityId],
) -> Result<Vec<EntityId>, StoreError> {
    check_owner(conn, relation, owner)?;
    let unique: BTreeSet<&EntityId> = targets.iter().collect();
    for target in &unique {
        check_target(conn, relation, target)?;
        check_campaign_open(conn, relation, owner, target)?;
    }

    let jt = relation.join_table();
    conn.execute(
        &format!("DELETE FROM {} WHERE {} = ?1", jt.table, jt.owner_column),
        params![owner],
    )?;
    let now = Utc::now();
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} ({}, {}, created, modified) VALUES (?1, ?2, ?3, ?3)",
        jt.table, jt.owner_column, jt.target_column
    ))?;
    for target in &unique {
        stmt.execute(params![owner, target, now])
            .map_err(|e| map_pair_unique(e, relation.as_str(), owner, target))?;
    }

    tracing::debug!(
        relation = %relation,
        owner = %owner,
        count = unique.len(),
        "replaced associations"
    );
    Ok(unique.into_iter().cloned().collect())
}

impl Store {
    /// Replace the owner's links under `relation` with exactly `targets`.
    ///
    /// Duplicate ids in `targets` are collapsed; an empty slice clears every link.
    pub fn replace_associations(
        &mut self,
        owner: &EntityId,
        relation: Relation,
        targets: &[EntityId],
    ) -> Result<Vec<EntityId>, StoreError> {
        self.write(|tx| replace_in(tx, relation, owner, targets))
    }

    /// Add one link; an existing pair is a `Duplicate` error
    pub fn link(
        &mut self,
        relation: Relation,
        owner: &EntityId,
        target: &EntityId,
    ) -> Result<Association, StoreError> {
        let association = self.write(|tx| {
            check_owner(tx, relation, owner)?;
            check_target(tx, relation, target)?;
            if relation.target() == EntityPrefix::Camp {
                let campaign = super::tracking::fetch_campaign(tx, target)?;
                if !campaign.is_selectable() {
                    return Err(StoreError::validation(
                        "association",
                        "target",
                        format!("campaign {} is done and cannot take new work", target),
                    ));
                }
            }
            let jt = relation.join_table();
            let now = Utc::now();
            tx.execute(
                &format!(
                    "INSERT INTO {} ({}, {}, created, modified) VALUES (?1, ?2, ?3, ?3)",
                    jt.table, jt.owner_column, jt.target_column
                ),
                params![owner, target, now],
            )
            .map_err(|e| map_pair_unique(e, relation.as_str(), owner, target))?;
            Ok(Association {
                relation,
                owner: owner.clone(),
                target: target.clone(),
                created: now,
                modified: now,
            })
        })?;
        tracing::debug!(relation = %relation, owner = %owner, target = %target, "linked");
        Ok(association)
    }

    /// Remove one link; a missing pair is `NotFound`
    pub fn unlink(
        &mut self,
        relation: Relation,
        owner: &EntityId,
        target: &EntityId,
    ) -> Result<(), StoreError> {
        self.write(|tx| {
            check_owner(tx, relation, owner)?;
            expect_prefix("association", "target", target, relation.target())?;
            let jt = relation.join_table();
            let affected = tx.execute(
                &format!(
                    "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
                    jt.table, jt.owner_column, jt.target_column
                ),
                params![owner, target],
            )?;
            if affected == 0 {
                return Err(StoreError::not_found(
                    "association",
                    format!("{} {} -> {}", relation, owner, target),
                ));
            }
            Ok(())
        })?;
        tracing::debug!(relation = %relation, owner = %owner, target = %target, "unlinked");
        Ok(())
    }

    /// Targets linked to `owner`, in the target type's default order
    pub fn linked(&self, relation: Relation, owner: &EntityId) -> Result<Vec<EntityId>, StoreError> {
        Ok(self
            .linked_targets(relation, owner)?
            .into_iter()
            .map(|c| c.id)
            .collect())
    }

    /// Like [`Store::linked`], with display labels
    pub fn linked_targets(
        &self,
        relation: Relation,
        owner: &EntityId,
    ) -> Result<Vec<Candidate>, StoreError> {
        check_owner(&self.conn, relation, owner)?;
        let jt = relation.join_table();
        let view = target_view(relation.target());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT t.id, {label} FROM {from} JOIN {table} j ON j.{tc} = t.id \
             WHERE j.{oc} = ?1 ORDER BY {order}",
            label = view.label,
            from = view.from,
            table = jt.table,
            tc = jt.target_column,
            oc = jt.owner_column,
            order = view.order,
        ))?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(Candidate {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Join rows for `owner` under `relation`, in the target type's default order
    pub fn associations(
        &self,
        relation: Relation,
        owner: &EntityId,
    ) -> Result<Vec<Association>, StoreError> {
        check_owner(&self.conn, relation, owner)?;
        let jt = relation.join_table();
        let view = target_view(relation.target());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT t.id, j.created, j.modified FROM {from} JOIN {table} j ON j.{tc} = t.id \
             WHERE j.{oc} = ?1 ORDER BY {order}",
            from = view.from,
            table = jt.table,
            tc = jt.target_column,
            oc = jt.owner_column,
            order = view.order,
        ))?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(Association {
                relation,
                owner: owner.clone(),
                target: row.get(0)?,
                created: row.get(1)?,
                modified: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Targets that may be offered for `relation`; Done campaigns are never offered
    pub fn candidates(&self, relation: Relation) -> Result<Vec<Candidate>, StoreError> {
        let view = target_view(relation.target());
        let filter = if relation.target() == EntityPrefix::Camp {
            format!(
                "WHERE t.status IN ({}, {})",
                Status::Todo.code(),
                Status::InProgress.code()
            )
        } else {
            String::new()
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT t.id, {} FROM {} {} ORDER BY {}",
            view.label, view.from, filter, view.order
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(Candidate {
                id: row.get(0)?,
                label: row.get(1)?,
            })
        })?;
        let candidates = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::trace!(relation = %relation, count = candidates.len(), "listed candidates");
        Ok(candidates)
    }

    /// Run a primary save and then the association replaces in one transaction
    fn save_with_links<T, F>(
        &mut self,
        owner: &EntityId,
        links: &[(Relation, Vec<EntityId>)],
        save: F,
    ) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        for (relation, _) in links {
            expect_prefix("association", "owner", owner, relation.owner())?;
        }
        self.write(|tx| {
            let saved = save(tx)?;
            for (relation, targets) in links {
                replace_in(tx, *relation, owner, targets)?;
            }
            Ok(saved)
        })
    }

    /// Update a campaign and replace its member sets together
    pub fn update_campaign_with_links(
        &mut self,
        campaign: &Campaign,
        links: &[(Relation, Vec<EntityId>)],
    ) -> Result<Campaign, StoreError> {
        campaign.validate()?;
        self.save_with_links(&campaign.id, links, |tx| save_campaign(tx, campaign))
    }

    /// Update a component feature and replace its campaign set together
    pub fn update_component_feature_with_links(
        &mut self,
        record: &ComponentFeature,
        links: &[(Relation, Vec<EntityId>)],
    ) -> Result<ComponentFeature, StoreError> {
        record.validate()?;
        self.save_with_links(&record.id, links, |tx| save_component_feature(tx, record))
    }

    /// Update a component activity and replace its campaign set together
    pub fn update_component_activity_with_links(
        &mut self,
        record: &ComponentActivity,
        links: &[(Relation, Vec<EntityId>)],
    ) -> Result<ComponentActivity, StoreError> {
        record.validate()?;
        self.save_with_links(&record.id, links, |tx| save_component_activity(tx, record))
    }

    /// Update a requirement and replace its activity or feature sets together
    pub fn update_requirement_with_links(
        &mut self,
        requirement: &Requirement,
        links: &[(Relation, Vec<EntityId>)],
    ) -> Result<Requirement, StoreError> {
        requirement.validate()?;
        self.save_with_links(&requirement.id, links, |tx| save_requirement(tx, requirement))
    }

    /// Update an activity and replace its requirement set together
    pub fn update_activity_with_links(
        &mut self,
        activity: &Activity,
        links: &[(Relation, Vec<EntityId>)],
    ) -> Result<Activity, StoreError> {
        activity.validate()?;
        self.save_with_links(&activity.id, links, |tx| save_activity(tx, activity))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    fn join_rows(store: &Store, table: &str) -> i64 {
        store
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    struct Setup {
        store: Store,
        campaign: Campaign,
        cfeat_a: ComponentFeature,
        cfeat_b: ComponentFeature,
    }

    fn setup() -> Setup {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let fips = fixtures::feature(&mut store, "FIPS");
        let audit = fixtures::feature(&mut store, "Audit");
        let cfeat_a = fixtures::component_feature(&mut store, &cmp.id, &fips.id);
        let cfeat_b = fixtures::component_feature(&mut store, &cmp.id, &audit.id);
        let campaign = fixtures::campaign(&mut store, "Q3");
        Setup {
            store,
            campaign,
            cfeat_a,
            cfeat_b,
        }
    }

    #[test]
    fn test_replace_twice_is_idempotent() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            cfeat_b,
        } = setup();
        let set = vec![cfeat_a.id.clone(), cfeat_b.id.clone()];

        store
            .replace_associations(&campaign.id, Relation::CampaignComponentFeatures, &set)
            .unwrap();
        store
            .replace_associations(&campaign.id, Relation::CampaignComponentFeatures, &set)
            .unwrap();

        assert_eq!(join_rows(&store, "campaign_component_features"), 2);
    }

    #[test]
    fn test_replace_collapses_duplicate_targets() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            ..
        } = setup();
        let set = vec![cfeat_a.id.clone(), cfeat_a.id.clone()];
        let linked = store
            .replace_associations(&campaign.id, Relation::CampaignComponentFeatures, &set)
            .unwrap();
        assert_eq!(linked, vec![cfeat_a.id.clone()]);
        assert_eq!(join_rows(&store, "campaign_component_features"), 1);
    }

    #[test]
    fn test_replace_with_empty_set_clears() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            cfeat_b,
        } = setup();
        store
            .replace_associations(
                &campaign.id,
                Relation::CampaignComponentFeatures,
                &[cfeat_a.id.clone(), cfeat_b.id.clone()],
            )
            .unwrap();
        store
            .replace_associations(&campaign.id, Relation::CampaignComponentFeatures, &[])
            .unwrap();
        assert!(store
            .linked(Relation::CampaignComponentFeatures, &campaign.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_replace_only_touches_its_owner() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            ..
        } = setup();
        let other = fixtures::campaign(&mut store, "Q4");
        store
            .link(Relation::CampaignComponentFeatures, &other.id, &cfeat_a.id)
            .unwrap();
        store
            .replace_associations(&campaign.id, Relation::CampaignComponentFeatures, &[])
            .unwrap();
        assert_eq!(
            store
                .linked(Relation::CampaignComponentFeatures, &other.id)
                .unwrap(),
            vec![cfeat_a.id.clone()]
        );
    }

    #[test]
    fn test_replace_with_missing_target_changes_nothing() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            ..
        } = setup();
        store
            .link(Relation::CampaignComponentFeatures, &campaign.id, &cfeat_a.id)
            .unwrap();
        let err = store
            .replace_associations(
                &campaign.id,
                Relation::CampaignComponentFeatures,
                &[EntityId::new(EntityPrefix::Cfeat)],
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(join_rows(&store, "campaign_component_features"), 1);
    }

    #[test]
    fn test_wrong_target_type_is_validation_error() {
        let Setup {
            mut store,
            campaign,
            ..
        } = setup();
        let err = store
            .replace_associations(
                &campaign.id,
                Relation::CampaignComponentFeatures,
                &[campaign.id.clone()],
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("target"));
    }

    #[test]
    fn test_duplicate_link_rejected_and_row_kept() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            ..
        } = setup();
        let first = store
            .link(Relation::CampaignComponentFeatures, &campaign.id, &cfeat_a.id)
            .unwrap();
        // Same pair from the other side of the join
        let err = store
            .link(Relation::ComponentFeatureCampaigns, &cfeat_a.id, &campaign.id)
            .unwrap_err();
        assert!(err.is_duplicate());

        let rows = store
            .associations(Relation::CampaignComponentFeatures, &campaign.id)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created, first.created);
    }

    #[test]
    fn test_unlink_missing_pair_is_not_found() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            ..
        } = setup();
        let err = store
            .unlink(Relation::CampaignComponentFeatures, &campaign.id, &cfeat_a.id)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_done_campaign_not_offered_but_existing_link_kept() {
        let Setup {
            mut store,
            mut campaign,
            cfeat_a,
            cfeat_b,
        } = setup();
        store
            .link(Relation::ComponentFeatureCampaigns, &cfeat_a.id, &campaign.id)
            .unwrap();

        campaign.status = Status::Done;
        store.update_campaign(&campaign).unwrap();
        let open = fixtures::campaign(&mut store, "Q4");

        let offered: Vec<EntityId> = store
            .candidates(Relation::ComponentFeatureCampaigns)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(offered, vec![open.id.clone()]);

        // The old link survives and re-saving the same set keeps it
        assert_eq!(
            store
                .linked(Relation::ComponentFeatureCampaigns, &cfeat_a.id)
                .unwrap(),
            vec![campaign.id.clone()]
        );
        store
            .replace_associations(
                &cfeat_a.id,
                Relation::ComponentFeatureCampaigns,
                &[campaign.id.clone(), open.id.clone()],
            )
            .unwrap();
        assert_eq!(
            store
                .linked(Relation::ComponentFeatureCampaigns, &cfeat_a.id)
                .unwrap()
                .len(),
            2
        );

        // A new feature cannot join the done campaign
        let err = store
            .link(Relation::ComponentFeatureCampaigns, &cfeat_b.id, &campaign.id)
            .unwrap_err();
        assert_eq!(err.field(), Some("target"));
        let err = store
            .replace_associations(
                &cfeat_b.id,
                Relation::ComponentFeatureCampaigns,
                &[campaign.id.clone()],
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_failed_primary_save_leaves_links_alone() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            cfeat_b,
        } = setup();
        store
            .link(Relation::CampaignComponentFeatures, &campaign.id, &cfeat_a.id)
            .unwrap();
        fixtures::campaign(&mut store, "Taken");

        let mut renamed = campaign.clone();
        renamed.name = "Taken".to_string();
        let err = store
            .update_campaign_with_links(
                &renamed,
                &[(
                    Relation::CampaignComponentFeatures,
                    vec![cfeat_b.id.clone()],
                )],
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("name"));
        assert_eq!(
            store
                .linked(Relation::CampaignComponentFeatures, &campaign.id)
                .unwrap(),
            vec![cfeat_a.id.clone()]
        );
    }

    #[test]
    fn test_update_with_links_saves_both() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            cfeat_b,
        } = setup();
        let mut edited = campaign.clone();
        edited.status = Status::InProgress;
        let saved = store
            .update_campaign_with_links(
                &edited,
                &[(
                    Relation::CampaignComponentFeatures,
                    vec![cfeat_b.id.clone(), cfeat_a.id.clone()],
                )],
            )
            .unwrap();
        assert_eq!(saved.status, Status::InProgress);

        // Listed in (component, feature) order: Audit before FIPS
        assert_eq!(
            store
                .linked(Relation::CampaignComponentFeatures, &campaign.id)
                .unwrap(),
            vec![cfeat_b.id.clone(), cfeat_a.id.clone()]
        );
    }

    #[test]
    fn test_requirement_activity_links_visible_from_both_sides() {
        let mut store = fixtures::store();
        let std = fixtures::standard(&mut store, "NIST", "800-53");
        let req = fixtures::requirement(&mut store, &std, "Review code");
        let review = fixtures::activity(&mut store, "Code review");
        let scan = fixtures::activity(&mut store, "Static analysis");

        let req = store
            .update_requirement_with_links(
                &req,
                &[(
                    Relation::RequirementActivities,
                    vec![scan.id.clone(), review.id.clone()],
                )],
            )
            .unwrap();

        assert_eq!(
            store
                .linked(Relation::RequirementActivities, &req.id)
                .unwrap(),
            vec![review.id.clone(), scan.id.clone()]
        );
        assert_eq!(
            store
                .linked(Relation::ActivityRequirements, &review.id)
                .unwrap(),
            vec![req.id.clone()]
        );
    }

    #[test]
    fn test_deleting_target_removes_join_rows() {
        let Setup {
            mut store,
            campaign,
            cfeat_a,
            ..
        } = setup();
        store
            .link(Relation::CampaignComponentFeatures, &campaign.id, &cfeat_a.id)
            .unwrap();
        store.delete_component_feature(&cfeat_a.id).unwrap();
        assert_eq!(join_rows(&store, "campaign_component_features"), 0);
    }

    #[test]
    fn test_concurrent_pair_creates_yield_one_duplicate() {
        use std::sync::{Arc, Barrier};
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tracker.db");
        let (campaign, cfeat) = {
            let mut store = Store::open(&path).unwrap();
            let sw = fixtures::software(&mut store, "RHEL");
            let cmp = fixtures::component(&mut store, &sw, "openssl");
            let feat = fixtures::feature(&mut store, "FIPS");
            let cf = fixtures::component_feature(&mut store, &cmp.id, &feat.id);
            let campaign = fixtures::campaign(&mut store, "Q3");
            (campaign.id, cf.id)
        };

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                let campaign = campaign.clone();
                let cfeat = cfeat.clone();
                std::thread::spawn(move || {
                    let mut store = Store::open(&path).unwrap();
                    barrier.wait();
                    store.link(Relation::CampaignComponentFeatures, &campaign, &cfeat)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_duplicate()))
            .count();
        assert_eq!((ok, dup), (1, 1));

        let store = Store::open(&path).unwrap();
        assert_eq!(join_rows(&store, "campaign_component_features"), 1);
    }
}
