//! Campaign status buckets and compliance matrices

use rusqlite::{params, Connection};

use super::catalog::fetch_component;
use super::compliance::{fetch_standard, requirements_of_standard, standards_of_component};
use super::tracking::{all_campaigns, component_activities_for_requirement, fetch_campaign};
use super::{CampaignSummary, ComplianceMatrix, ComplianceRow, StatusBuckets, Store};
use crate::core::entity::Status;
use crate::core::error::StoreError;
use crate::core::identity::EntityId;
use crate::entities::{Component, Standard};

/// Count linked component features and component activities by status
fn buckets_for(conn: &Connection, campaign: &EntityId) -> Result<StatusBuckets, StoreError> {
    let mut stmt = conn.prepare(
        r#"SELECT status, COUNT(*) FROM (
               SELECT cf.status AS status
               FROM component_features cf
               JOIN campaign_component_features j ON j.component_feature_id = cf.id
               WHERE j.campaign_id = ?1
               UNION ALL
               SELECT ca.status AS status
               FROM component_activities ca
               JOIN campaign_component_activities j ON j.component_activity_id = ca.id
               WHERE j.campaign_id = ?1
           )
           GROUP BY status"#,
    )?;
    let counts = stmt.query_map(params![campaign], |row| {
        Ok((row.get::<_, Status>(0)?, row.get::<_, i64>(1)?))
    })?;

    let (mut todo, mut in_progress, mut done) = (0usize, 0usize, 0usize);
    for entry in counts {
        let (status, count) = entry?;
        let count = count as usize;
        match status {
            Status::Todo => todo += count,
            Status::InProgress => in_progress += count,
            Status::Done => done += count,
        }
    }
    Ok(StatusBuckets::new(todo, in_progress, done))
}

fn matrix_for(
    conn: &Connection,
    component: Component,
    standard: Standard,
) -> Result<ComplianceMatrix, StoreError> {
    let rows = requirements_of_standard(conn, &standard.id)?
        .into_iter()
        .map(|requirement| {
            let activities =
                component_activities_for_requirement(conn, &component.id, &requirement.id)?;
            Ok(ComplianceRow {
                requirement,
                activities,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;
    Ok(ComplianceMatrix {
        component,
        standard,
        rows,
    })
}

impl Store {
    /// Status counts over everything linked to a campaign
    pub fn campaign_status_buckets(&self, campaign: &EntityId) -> Result<StatusBuckets, StoreError> {
        fetch_campaign(&self.conn, campaign)?;
        let buckets = buckets_for(&self.conn, campaign)?;
        tracing::trace!(campaign = %campaign, ?buckets, "computed status buckets");
        Ok(buckets)
    }

    /// Every campaign with its buckets, in campaign order
    pub fn campaign_dashboard(&self) -> Result<Vec<CampaignSummary>, StoreError> {
        all_campaigns(&self.conn)?
            .into_iter()
            .map(|campaign| {
                let buckets = buckets_for(&self.conn, &campaign.id)?;
                Ok(CampaignSummary { campaign, buckets })
            })
            .collect()
    }

    /// For each requirement of `standard`, the component's executions of
    /// activities that satisfy it. An empty list marks a gap.
    pub fn compliance_matrix(
        &self,
        component: &EntityId,
        standard: &EntityId,
    ) -> Result<ComplianceMatrix, StoreError> {
        let component = fetch_component(&self.conn, component)?;
        let standard = fetch_standard(&self.conn, standard)?;
        let matrix = matrix_for(&self.conn, component, standard)?;
        tracing::trace!(
            component = %matrix.component.id,
            standard = %matrix.standard.id,
            requirements = matrix.rows.len(),
            gaps = matrix.gaps().len(),
            "computed compliance matrix"
        );
        Ok(matrix)
    }

    /// One compliance matrix per standard the component is linked to, by standard name
    pub fn statement_of_applicability(
        &self,
        component: &EntityId,
    ) -> Result<Vec<ComplianceMatrix>, StoreError> {
        let component = fetch_component(&self.conn, component)?;
        standards_of_component(&self.conn, &component.id)?
            .into_iter()
            .map(|standard| matrix_for(&self.conn, component.clone(), standard))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::entities::Relation;

    #[test]
    fn test_buckets_count_features_and_activities() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let fips = fixtures::feature(&mut store, "FIPS");
        let audit = fixtures::feature(&mut store, "Audit");
        let review = fixtures::activity(&mut store, "Code review");
        let campaign = fixtures::campaign(&mut store, "Q3");

        let cf_todo = fixtures::component_feature(&mut store, &cmp.id, &fips.id);
        let mut cf_done = fixtures::component_feature(&mut store, &cmp.id, &audit.id);
        cf_done.status = Status::Done;
        store.update_component_feature(&cf_done).unwrap();
        let mut ca = fixtures::component_activity(&mut store, &cmp.id, &review.id);
        ca.status = Status::InProgress;
        store.update_component_activity(&ca).unwrap();

        store
            .replace_associations(
                &campaign.id,
                Relation::CampaignComponentFeatures,
                &[cf_todo.id.clone(), cf_done.id.clone()],
            )
            .unwrap();
        store
            .replace_associations(&campaign.id, Relation::CampaignActivities, &[ca.id.clone()])
            .unwrap();

        let buckets = store.campaign_status_buckets(&campaign.id).unwrap();
        assert_eq!(buckets, StatusBuckets::new(1, 1, 1));
        assert_eq!(buckets.pending, 2);
    }

    #[test]
    fn test_buckets_for_empty_campaign_are_zero() {
        let mut store = fixtures::store();
        let campaign = fixtures::campaign(&mut store, "Empty");
        assert_eq!(
            store.campaign_status_buckets(&campaign.id).unwrap(),
            StatusBuckets::default()
        );
    }

    #[test]
    fn test_buckets_for_missing_campaign_is_not_found() {
        let store = fixtures::store();
        let err = store
            .campaign_status_buckets(&EntityId::new(crate::core::identity::EntityPrefix::Camp))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_dashboard_lists_every_campaign() {
        let mut store = fixtures::store();
        fixtures::campaign(&mut store, "B");
        fixtures::campaign(&mut store, "A");
        let names: Vec<String> = store
            .campaign_dashboard()
            .unwrap()
            .into_iter()
            .map(|s| s.campaign.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_compliance_matrix_marks_gaps() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let other = fixtures::component(&mut store, &sw, "zlib");
        let std = fixtures::standard(&mut store, "NIST", "800-53");
        let covered = fixtures::requirement(&mut store, &std, "Review code");
        let gap = fixtures::requirement(&mut store, &std, "Train staff");
        let review = fixtures::activity(&mut store, "Code review");

        store
            .replace_associations(&review.id, Relation::ActivityRequirements, &[covered.id.clone()])
            .unwrap();
        let ca = fixtures::component_activity(&mut store, &cmp.id, &review.id);
        // An execution for another component does not count
        fixtures::component_activity(&mut store, &other.id, &review.id);

        let matrix = store.compliance_matrix(&cmp.id, &std.id).unwrap();
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].requirement.id, covered.id);
        assert_eq!(
            matrix.rows[0]
                .activities
                .iter()
                .map(|a| a.id.clone())
                .collect::<Vec<_>>(),
            vec![ca.id.clone()]
        );
        assert_eq!(matrix.rows[1].requirement.id, gap.id);
        assert!(matrix.rows[1].activities.is_empty());

        let gaps: Vec<&EntityId> = matrix.gaps().into_iter().map(|r| &r.id).collect();
        assert_eq!(gaps, vec![&gap.id]);
        assert_eq!(matrix.covered(), 1);
    }

    #[test]
    fn test_statement_of_applicability_follows_linked_standards() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let cmp = fixtures::component(&mut store, &sw, "openssl");
        let nist = fixtures::standard(&mut store, "NIST", "800-53");
        let fips = fixtures::standard(&mut store, "FIPS", "140-3");
        fixtures::standard(&mut store, "Unlinked", "X");
        fixtures::requirement(&mut store, &nist, "AC-1");

        store
            .replace_associations(
                &cmp.id,
                Relation::ComponentStandards,
                &[nist.id.clone(), fips.id.clone()],
            )
            .unwrap();

        let soa = store.statement_of_applicability(&cmp.id).unwrap();
        let names: Vec<&str> = soa.iter().map(|m| m.standard.name.as_str()).collect();
        assert_eq!(names, vec!["FIPS", "NIST"]);
        assert!(soa[0].rows.is_empty());
        assert_eq!(soa[1].gaps().len(), 1);
    }
}
