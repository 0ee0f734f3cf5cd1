//! Contact rollup for campaigns

use rusqlite::params;

use super::tracking::fetch_campaign;
use super::{ContactRollup, Store};
use crate::core::error::StoreError;
use crate::core::identity::EntityId;
use crate::entities::ContactKind;

/// Role and email of every contact on a component reachable from the campaign.
/// `UNION` over the two paths collapses components reached both ways.
const CAMPAIGN_CONTACTS_SQL: &str = r#"
    WITH reached AS (
        SELECT cf.component_id AS component_id
        FROM component_features cf
        JOIN campaign_component_features j ON j.component_feature_id = cf.id
        WHERE j.campaign_id = ?1
        UNION
        SELECT ca.component_id
        FROM component_activities ca
        JOIN campaign_component_activities j ON j.component_activity_id = ca.id
        WHERE j.campaign_id = ?1
    )
    SELECT 'engineering', ct.email
    FROM reached r
    JOIN components c ON c.id = r.component_id
    JOIN contacts ct ON ct.id = c.engineering_contact_id
    UNION ALL
    SELECT 'business', ct.email
    FROM reached r
    JOIN components c ON c.id = r.component_id
    JOIN contacts ct ON ct.id = c.business_contact_id
    UNION ALL
    SELECT 'psrd', ct.email
    FROM reached r
    JOIN components c ON c.id = r.component_id
    JOIN contacts ct ON ct.id = c.psrd_contact_id"#;

impl Store {
    /// Contact emails by role for every component the campaign touches
    pub fn campaign_contacts(&self, campaign: &EntityId) -> Result<ContactRollup, StoreError> {
        fetch_campaign(&self.conn, campaign)?;
        let mut stmt = self.conn.prepare(CAMPAIGN_CONTACTS_SQL)?;
        let rows = stmt.query_map(params![campaign], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut rollup = ContactRollup::default();
        for row in rows {
            let (role, email) = row?;
            let email = match email.as_deref().map(str::trim) {
                Some(e) if !e.is_empty() => e.to_string(),
                _ => continue,
            };
            let bucket = match role.parse::<ContactKind>() {
                Ok(ContactKind::Engineering) => &mut rollup.engineering,
                Ok(ContactKind::Business) => &mut rollup.business,
                Ok(ContactKind::Psrd) => &mut rollup.psrd,
                Err(_) => continue,
            };
            bucket.insert(email);
        }
        tracing::trace!(campaign = %campaign, "computed contact rollup");
        Ok(rollup)
    }

    /// Sorted, de-duplicated emails of all contacts on the campaign's components
    pub fn campaign_contact_emails(&self, campaign: &EntityId) -> Result<Vec<String>, StoreError> {
        Ok(self.campaign_contacts(campaign)?.emails())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::entities::{Component, Contact, Relation};

    #[test]
    fn test_shared_email_reached_two_ways_appears_once() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let eng = fixtures::contact(&mut store, "Eng", "eng@example.com");
        let biz = store
            .create_contact(&Contact::new("Biz", "biz@example.com", ContactKind::Business))
            .unwrap();

        let mut a = Component::new("openssl", sw.id.clone());
        a.contacts.engineering = Some(eng.id.clone());
        a.contacts.business = Some(biz.id.clone());
        let a = store.create_component(&a).unwrap();
        let mut b = Component::new("zlib", sw.id.clone());
        b.contacts.engineering = Some(eng.id.clone());
        let b = store.create_component(&b).unwrap();

        let feat = fixtures::feature(&mut store, "FIPS");
        let act = fixtures::activity(&mut store, "Review");
        let cf = fixtures::component_feature(&mut store, &a.id, &feat.id);
        let ca = fixtures::component_activity(&mut store, &b.id, &act.id);

        let campaign = fixtures::campaign(&mut store, "Q3");
        store
            .replace_associations(&campaign.id, Relation::CampaignComponentFeatures, &[cf.id])
            .unwrap();
        store
            .replace_associations(&campaign.id, Relation::CampaignActivities, &[ca.id])
            .unwrap();

        assert_eq!(
            store.campaign_contact_emails(&campaign.id).unwrap(),
            vec!["biz@example.com", "eng@example.com"]
        );
        let rollup = store.campaign_contacts(&campaign.id).unwrap();
        assert_eq!(rollup.engineering.len(), 1);
        assert_eq!(rollup.business.len(), 1);
        assert!(rollup.psrd.is_empty());
    }

    #[test]
    fn test_blank_emails_skipped() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let nobody = fixtures::contact(&mut store, "No email", "");
        let mut cmp = Component::new("openssl", sw.id.clone());
        cmp.contacts.psrd = Some(nobody.id.clone());
        let cmp = store.create_component(&cmp).unwrap();
        let feat = fixtures::feature(&mut store, "FIPS");
        let cf = fixtures::component_feature(&mut store, &cmp.id, &feat.id);
        let campaign = fixtures::campaign(&mut store, "Q3");
        store
            .link(Relation::CampaignComponentFeatures, &campaign.id, &cf.id)
            .unwrap();

        assert!(store.campaign_contact_emails(&campaign.id).unwrap().is_empty());
    }

    #[test]
    fn test_campaign_without_members_has_no_contacts() {
        let mut store = fixtures::store();
        let campaign = fixtures::campaign(&mut store, "Q3");
        assert!(store.campaign_contacts(&campaign.id).unwrap().is_empty());
    }
}
