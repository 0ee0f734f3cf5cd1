//! Software, components, contacts, features, feature categories and threats

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_exists, expect_affected, expect_prefix, map_unique, Store};
use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{
    Component, ComponentContacts, Contact, Feature, FeatureCategory, Milestones, Software, Threat,
};

// =========================================================================
// Software
// =========================================================================

const SOFTWARE_COLUMNS: &str = "id, name, description, created, modified";

fn software_from_row(row: &Row<'_>) -> rusqlite::Result<Software> {
    Ok(Software {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created: row.get(3)?,
        modified: row.get(4)?,
    })
}

pub(crate) fn fetch_software(conn: &Connection, id: &EntityId) -> Result<Software, StoreError> {
    expect_prefix("software", "id", id, EntityPrefix::Sw)?;
    conn.query_row(
        &format!("SELECT {} FROM software WHERE id = ?1", SOFTWARE_COLUMNS),
        params![id],
        software_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("software", id))
}

impl Store {
    pub fn create_software(&mut self, software: &Software) -> Result<Software, StoreError> {
        software.validate()?;
        let software = self.write(|tx| {
            tx.execute(
                "INSERT INTO software (id, name, description, created, modified) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    software.id,
                    software.name.trim(),
                    software.description,
                    software.created,
                    software.modified
                ],
            )
            .map_err(|e| map_unique(e, "software"))?;
            fetch_software(tx, &software.id)
        })?;
        tracing::debug!(id = %software.id, name = %software.name, "created software");
        Ok(software)
    }

    pub fn get_software(&self, id: &EntityId) -> Result<Software, StoreError> {
        fetch_software(&self.conn, id)
    }

    /// All software products, ordered by name
    pub fn list_software(&self) -> Result<Vec<Software>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM software ORDER BY name, rowid",
            SOFTWARE_COLUMNS
        ))?;
        let rows = stmt.query_map([], software_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_software(&mut self, software: &Software) -> Result<Software, StoreError> {
        software.validate()?;
        let software = self.write(|tx| {
            let affected = tx
                .execute(
                    "UPDATE software SET name = ?2, description = ?3, modified = ?4 WHERE id = ?1",
                    params![
                        software.id,
                        software.name.trim(),
                        software.description,
                        Utc::now()
                    ],
                )
                .map_err(|e| map_unique(e, "software"))?;
            expect_affected(affected, &software.id)?;
            fetch_software(tx, &software.id)
        })?;
        tracing::debug!(id = %software.id, "updated software");
        Ok(software)
    }

    /// Delete a software product and, by cascade, its components
    pub fn delete_software(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("software", "id", id, EntityPrefix::Sw)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM software WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted software");
        Ok(())
    }
}

// =========================================================================
// Contacts
// =========================================================================

const CONTACT_COLUMNS: &str = "id, name, email, kind, created, modified";

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let kind: String = row.get(3)?;
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        kind: kind
            .parse()
            .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                e.into(),
            ))?,
        created: row.get(4)?,
        modified: row.get(5)?,
    })
}

pub(crate) fn fetch_contact(conn: &Connection, id: &EntityId) -> Result<Contact, StoreError> {
    expect_prefix("contact", "id", id, EntityPrefix::Con)?;
    conn.query_row(
        &format!("SELECT {} FROM contacts WHERE id = ?1", CONTACT_COLUMNS),
        params![id],
        contact_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("contact", id))
}

impl Store {
    pub fn create_contact(&mut self, contact: &Contact) -> Result<Contact, StoreError> {
        contact.validate()?;
        let contact = self.write(|tx| {
            tx.execute(
                "INSERT INTO contacts (id, name, email, kind, created, modified) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    contact.id,
                    contact.name.trim(),
                    contact.email.trim(),
                    contact.kind.as_str(),
                    contact.created,
                    contact.modified
                ],
            )?;
            fetch_contact(tx, &contact.id)
        })?;
        tracing::debug!(id = %contact.id, "created contact");
        Ok(contact)
    }

    pub fn get_contact(&self, id: &EntityId) -> Result<Contact, StoreError> {
        fetch_contact(&self.conn, id)
    }

    /// All contacts, ordered by name
    pub fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM contacts ORDER BY name, rowid",
            CONTACT_COLUMNS
        ))?;
        let rows = stmt.query_map([], contact_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_contact(&mut self, contact: &Contact) -> Result<Contact, StoreError> {
        contact.validate()?;
        self.write(|tx| {
            let affected = tx.execute(
                "UPDATE contacts SET name = ?2, email = ?3, kind = ?4, modified = ?5 WHERE id = ?1",
                params![
                    contact.id,
                    contact.name.trim(),
                    contact.email.trim(),
                    contact.kind.as_str(),
                    Utc::now()
                ],
            )?;
            expect_affected(affected, &contact.id)?;
            fetch_contact(tx, &contact.id)
        })
    }

    /// Delete a contact; components referencing it keep existing with the role cleared
    pub fn delete_contact(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("contact", "id", id, EntityPrefix::Con)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted contact");
        Ok(())
    }
}

// =========================================================================
// Components
// =========================================================================

const COMPONENT_COLUMNS: &str = "id, name, description, repo_url, software_id, \
     engineering_contact_id, business_contact_id, psrd_contact_id, ticket_url, \
     dev_preview_date, tech_preview_date, ga_date, created, modified";

fn component_from_row(row: &Row<'_>) -> rusqlite::Result<Component> {
    Ok(Component {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        repo_url: row.get(3)?,
        software: row.get(4)?,
        contacts: ComponentContacts {
            engineering: row.get(5)?,
            business: row.get(6)?,
            psrd: row.get(7)?,
        },
        ticket_url: row.get(8)?,
        milestones: Milestones {
            dev_preview: row.get(9)?,
            tech_preview: row.get(10)?,
            general_availability: row.get(11)?,
        },
        created: row.get(12)?,
        modified: row.get(13)?,
    })
}

pub(crate) fn fetch_component(conn: &Connection, id: &EntityId) -> Result<Component, StoreError> {
    expect_prefix("component", "id", id, EntityPrefix::Cmp)?;
    conn.query_row(
        &format!("SELECT {} FROM components WHERE id = ?1", COMPONENT_COLUMNS),
        params![id],
        component_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("component", id))
}

/// Referenced software and contacts must exist before a component is written
fn check_component_refs(conn: &Connection, component: &Component) -> Result<(), StoreError> {
    ensure_exists(conn, &component.software)?;
    for (_, contact) in component.contacts.iter() {
        ensure_exists(conn, contact)?;
    }
    Ok(())
}

impl Store {
    pub fn create_component(&mut self, component: &Component) -> Result<Component, StoreError> {
        component.validate()?;
        let component = self.write(|tx| {
            check_component_refs(tx, component)?;
            tx.execute(
                &format!(
                    "INSERT INTO components ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    COMPONENT_COLUMNS
                ),
                params![
                    component.id,
                    component.name.trim(),
                    component.description,
                    component.repo_url.trim(),
                    component.software,
                    component.contacts.engineering,
                    component.contacts.business,
                    component.contacts.psrd,
                    component.ticket_url.trim(),
                    component.milestones.dev_preview,
                    component.milestones.tech_preview,
                    component.milestones.general_availability,
                    component.created,
                    component.modified
                ],
            )
            .map_err(|e| map_unique(e, "component"))?;
            fetch_component(tx, &component.id)
        })?;
        tracing::debug!(id = %component.id, name = %component.name, "created component");
        Ok(component)
    }

    pub fn get_component(&self, id: &EntityId) -> Result<Component, StoreError> {
        fetch_component(&self.conn, id)
    }

    /// Components ordered by name, optionally only those of one software product
    pub fn list_components(&self, software: Option<&EntityId>) -> Result<Vec<Component>, StoreError> {
        match software {
            Some(sw) => {
                fetch_software(&self.conn, sw)?;
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM components WHERE software_id = ?1 ORDER BY name, rowid",
                    COMPONENT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![sw], component_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM components ORDER BY name, rowid",
                    COMPONENT_COLUMNS
                ))?;
                let rows = stmt.query_map([], component_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
        }
    }

    pub fn update_component(&mut self, component: &Component) -> Result<Component, StoreError> {
        component.validate()?;
        let component = self.write(|tx| {
            check_component_refs(tx, component)?;
            let affected = tx
                .execute(
                    r#"UPDATE components SET name = ?2, description = ?3, repo_url = ?4,
                          software_id = ?5, engineering_contact_id = ?6, business_contact_id = ?7,
                          psrd_contact_id = ?8, ticket_url = ?9, dev_preview_date = ?10,
                          tech_preview_date = ?11, ga_date = ?12, modified = ?13
                       WHERE id = ?1"#,
                    params![
                        component.id,
                        component.name.trim(),
                        component.description,
                        component.repo_url.trim(),
                        component.software,
                        component.contacts.engineering,
                        component.contacts.business,
                        component.contacts.psrd,
                        component.ticket_url.trim(),
                        component.milestones.dev_preview,
                        component.milestones.tech_preview,
                        component.milestones.general_availability,
                        Utc::now()
                    ],
                )
                .map_err(|e| map_unique(e, "component"))?;
            expect_affected(affected, &component.id)?;
            fetch_component(tx, &component.id)
        })?;
        tracing::debug!(id = %component.id, "updated component");
        Ok(component)
    }

    /// Delete a component with its feature records, activity executions and their links
    pub fn delete_component(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("component", "id", id, EntityPrefix::Cmp)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM components WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted component");
        Ok(())
    }
}

// =========================================================================
// Feature categories
// =========================================================================

const CATEGORY_COLUMNS: &str = "id, name, description, created, modified";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<FeatureCategory> {
    Ok(FeatureCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created: row.get(3)?,
        modified: row.get(4)?,
    })
}

fn fetch_category(conn: &Connection, id: &EntityId) -> Result<FeatureCategory, StoreError> {
    expect_prefix("feature category", "id", id, EntityPrefix::Fcat)?;
    conn.query_row(
        &format!("SELECT {} FROM feature_categories WHERE id = ?1", CATEGORY_COLUMNS),
        params![id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("feature category", id))
}

impl Store {
    pub fn create_category(
        &mut self,
        category: &FeatureCategory,
    ) -> Result<FeatureCategory, StoreError> {
        category.validate()?;
        self.write(|tx| {
            tx.execute(
                "INSERT INTO feature_categories (id, name, description, created, modified) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    category.id,
                    category.name.trim(),
                    category.description,
                    category.created,
                    category.modified
                ],
            )
            .map_err(|e| map_unique(e, "feature category"))?;
            fetch_category(tx, &category.id)
        })
    }

    pub fn get_category(&self, id: &EntityId) -> Result<FeatureCategory, StoreError> {
        fetch_category(&self.conn, id)
    }

    pub fn list_categories(&self) -> Result<Vec<FeatureCategory>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM feature_categories ORDER BY name, rowid",
            CATEGORY_COLUMNS
        ))?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_category(
        &mut self,
        category: &FeatureCategory,
    ) -> Result<FeatureCategory, StoreError> {
        category.validate()?;
        self.write(|tx| {
            let affected = tx
                .execute(
                    "UPDATE feature_categories SET name = ?2, description = ?3, modified = ?4 WHERE id = ?1",
                    params![category.id, category.name.trim(), category.description, Utc::now()],
                )
                .map_err(|e| map_unique(e, "feature category"))?;
            expect_affected(affected, &category.id)?;
            fetch_category(tx, &category.id)
        })
    }

    /// Delete a category; its features are deleted with it
    pub fn delete_category(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("feature category", "id", id, EntityPrefix::Fcat)?;
        self.write(|tx| {
            let affected =
                tx.execute("DELETE FROM feature_categories WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted feature category");
        Ok(())
    }
}

// =========================================================================
// Features
// =========================================================================

const FEATURE_COLUMNS: &str = "id, name, description, category_id, created, modified";

fn feature_from_row(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        created: row.get(4)?,
        modified: row.get(5)?,
    })
}

pub(crate) fn fetch_feature(conn: &Connection, id: &EntityId) -> Result<Feature, StoreError> {
    expect_prefix("feature", "id", id, EntityPrefix::Feat)?;
    conn.query_row(
        &format!("SELECT {} FROM features WHERE id = ?1", FEATURE_COLUMNS),
        params![id],
        feature_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("feature", id))
}

impl Store {
    pub fn create_feature(&mut self, feature: &Feature) -> Result<Feature, StoreError> {
        feature.validate()?;
        let feature = self.write(|tx| {
            if let Some(category) = &feature.category {
                ensure_exists(tx, category)?;
            }
            tx.execute(
                "INSERT INTO features (id, name, description, category_id, created, modified) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    feature.id,
                    feature.name.trim(),
                    feature.description,
                    feature.category,
                    feature.created,
                    feature.modified
                ],
            )
            .map_err(|e| map_unique(e, "feature"))?;
            fetch_feature(tx, &feature.id)
        })?;
        tracing::debug!(id = %feature.id, name = %feature.name, "created feature");
        Ok(feature)
    }

    pub fn get_feature(&self, id: &EntityId) -> Result<Feature, StoreError> {
        fetch_feature(&self.conn, id)
    }

    /// Features ordered by name, optionally only those in one category
    pub fn list_features(&self, category: Option<&EntityId>) -> Result<Vec<Feature>, StoreError> {
        match category {
            Some(cat) => {
                fetch_category(&self.conn, cat)?;
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM features WHERE category_id = ?1 ORDER BY name, rowid",
                    FEATURE_COLUMNS
                ))?;
                let rows = stmt.query_map(params![cat], feature_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM features ORDER BY name, rowid",
                    FEATURE_COLUMNS
                ))?;
                let rows = stmt.query_map([], feature_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
        }
    }

    pub fn update_feature(&mut self, feature: &Feature) -> Result<Feature, StoreError> {
        feature.validate()?;
        self.write(|tx| {
            if let Some(category) = &feature.category {
                ensure_exists(tx, category)?;
            }
            let affected = tx
                .execute(
                    "UPDATE features SET name = ?2, description = ?3, category_id = ?4, modified = ?5 WHERE id = ?1",
                    params![
                        feature.id,
                        feature.name.trim(),
                        feature.description,
                        feature.category,
                        Utc::now()
                    ],
                )
                .map_err(|e| map_unique(e, "feature"))?;
            expect_affected(affected, &feature.id)?;
            fetch_feature(tx, &feature.id)
        })
    }

    pub fn delete_feature(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("feature", "id", id, EntityPrefix::Feat)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM features WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted feature");
        Ok(())
    }
}

// =========================================================================
// Threats
// =========================================================================

const THREAT_COLUMNS: &str = "id, name, description, created, modified";

fn threat_from_row(row: &Row<'_>) -> rusqlite::Result<Threat> {
    Ok(Threat {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created: row.get(3)?,
        modified: row.get(4)?,
    })
}

fn fetch_threat(conn: &Connection, id: &EntityId) -> Result<Threat, StoreError> {
    expect_prefix("threat", "id", id, EntityPrefix::Thr)?;
    conn.query_row(
        &format!("SELECT {} FROM threats WHERE id = ?1", THREAT_COLUMNS),
        params![id],
        threat_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("threat", id))
}

impl Store {
    pub fn create_threat(&mut self, threat: &Threat) -> Result<Threat, StoreError> {
        threat.validate()?;
        self.write(|tx| {
            tx.execute(
                "INSERT INTO threats (id, name, description, created, modified) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    threat.id,
                    threat.name.trim(),
                    threat.description,
                    threat.created,
                    threat.modified
                ],
            )
            .map_err(|e| map_unique(e, "threat"))?;
            fetch_threat(tx, &threat.id)
        })
    }

    pub fn get_threat(&self, id: &EntityId) -> Result<Threat, StoreError> {
        fetch_threat(&self.conn, id)
    }

    pub fn list_threats(&self) -> Result<Vec<Threat>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM threats ORDER BY name, rowid",
            THREAT_COLUMNS
        ))?;
        let rows = stmt.query_map([], threat_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_threat(&mut self, threat: &Threat) -> Result<Threat, StoreError> {
        threat.validate()?;
        self.write(|tx| {
            let affected = tx
                .execute(
                    "UPDATE threats SET name = ?2, description = ?3, modified = ?4 WHERE id = ?1",
                    params![threat.id, threat.name.trim(), threat.description, Utc::now()],
                )
                .map_err(|e| map_unique(e, "threat"))?;
            expect_affected(affected, &threat.id)?;
            fetch_threat(tx, &threat.id)
        })
    }

    pub fn delete_threat(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("threat", "id", id, EntityPrefix::Thr)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM threats WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::entities::ContactKind;

    #[test]
    fn test_duplicate_software_name_rejected() {
        let mut store = fixtures::store();
        fixtures::software(&mut store, "RHEL");

        let err = store
            .create_software(&Software::new("RHEL", "again"))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("name"));
        assert_eq!(store.list_software().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected_for_all_named_entities() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "OpenShift");
        fixtures::component(&mut store, &sw, "installer");
        fixtures::feature(&mut store, "FIPS");
        store
            .create_category(&FeatureCategory::new("Crypto", ""))
            .unwrap();
        store.create_threat(&Threat::new("Spoofing", "")).unwrap();

        let err = store
            .create_component(&Component::new("installer", sw.id.clone()))
            .unwrap_err();
        assert_eq!(err.field(), Some("name"));
        assert!(store.create_feature(&Feature::new("FIPS")).is_err());
        assert!(store
            .create_category(&FeatureCategory::new("Crypto", ""))
            .is_err());
        assert!(store.create_threat(&Threat::new("Spoofing", "")).is_err());

        assert_eq!(store.list_components(None).unwrap().len(), 1);
        assert_eq!(store.list_features(None).unwrap().len(), 1);
        assert_eq!(store.list_categories().unwrap().len(), 1);
        assert_eq!(store.list_threats().unwrap().len(), 1);
    }

    #[test]
    fn test_component_with_missing_software_is_not_found() {
        let mut store = fixtures::store();
        let orphan = Component::new("floating", EntityId::new(EntityPrefix::Sw));
        let err = store.create_component(&orphan).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.list_components(None).unwrap().is_empty());
    }

    #[test]
    fn test_components_listed_by_name_and_scoped_by_software() {
        let mut store = fixtures::store();
        let rhel = fixtures::software(&mut store, "RHEL");
        let ocp = fixtures::software(&mut store, "OpenShift");
        fixtures::component(&mut store, &rhel, "systemd");
        fixtures::component(&mut store, &ocp, "etcd");
        fixtures::component(&mut store, &rhel, "kernel");

        let all: Vec<String> = store
            .list_components(None)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(all, vec!["etcd", "kernel", "systemd"]);

        let rhel_only: Vec<String> = store
            .list_components(Some(&rhel.id))
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(rhel_only, vec!["kernel", "systemd"]);
    }

    #[test]
    fn test_update_is_full_record_replace() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let mut cmp = Component::new("kernel", sw.id.clone());
        cmp.description = "Linux kernel".to_string();
        cmp.repo_url = "https://gitlab.com/kernel".to_string();
        let created = store.create_component(&cmp).unwrap();

        let mut edited = Component::new("kernel-rt", sw.id.clone());
        edited.id = created.id.clone();
        let updated = store.update_component(&edited).unwrap();

        assert_eq!(updated.name, "kernel-rt");
        assert!(updated.description.is_empty());
        assert!(updated.repo_url.is_empty());
        assert!(updated.modified >= created.modified);
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        let mut store = fixtures::store();
        let err = store
            .update_software(&Software::new("ghost", ""))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deleting_contact_clears_component_reference() {
        let mut store = fixtures::store();
        let sw = fixtures::software(&mut store, "RHEL");
        let contact = store
            .create_contact(&Contact::new("Eng", "eng@example.com", ContactKind::Engineering))
            .unwrap();
        let mut cmp = Component::new("kernel", sw.id.clone());
        cmp.contacts.engineering = Some(contact.id.clone());
        let cmp = store.create_component(&cmp).unwrap();

        store.delete_contact(&contact.id).unwrap();

        let reloaded = store.get_component(&cmp.id).unwrap();
        assert!(reloaded.contacts.engineering.is_none());
    }

    #[test]
    fn test_deleting_category_cascades_to_features() {
        let mut store = fixtures::store();
        let cat = store
            .create_category(&FeatureCategory::new("Crypto", ""))
            .unwrap();
        let mut feat = Feature::new("FIPS");
        feat.category = Some(cat.id.clone());
        store.create_feature(&feat).unwrap();
        fixtures::feature(&mut store, "SELinux");

        assert_eq!(store.list_features(Some(&cat.id)).unwrap().len(), 1);
        store.delete_category(&cat.id).unwrap();

        let names: Vec<String> = store
            .list_features(None)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["SELinux"]);
    }

    #[test]
    fn test_get_with_wrong_prefix_is_validation_error() {
        let store = fixtures::store();
        let err = store
            .get_software(&EntityId::new(EntityPrefix::Cmp))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("id"));
    }
}
