//! Standards, requirements and activity templates

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_exists, expect_affected, expect_prefix, map_unique, Store};
use crate::core::entity::Entity;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::{Activity, Requirement, Standard};

// =========================================================================
// Standards
// =========================================================================

const STANDARD_COLUMNS: &str = "id, name, code, description, created, modified";

fn standard_from_row(row: &Row<'_>) -> rusqlite::Result<Standard> {
    Ok(Standard {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        description: row.get(3)?,
        created: row.get(4)?,
        modified: row.get(5)?,
    })
}

pub(crate) fn fetch_standard(conn: &Connection, id: &EntityId) -> Result<Standard, StoreError> {
    expect_prefix("standard", "id", id, EntityPrefix::Std)?;
    conn.query_row(
        &format!("SELECT {} FROM standards WHERE id = ?1", STANDARD_COLUMNS),
        params![id],
        standard_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("standard", id))
}

/// Standards linked to a component, ordered by name
pub(crate) fn standards_of_component(
    conn: &Connection,
    component: &EntityId,
) -> Result<Vec<Standard>, StoreError> {
    let mut stmt = conn.prepare(
        r#"SELECT s.id, s.name, s.code, s.description, s.created, s.modified
           FROM standards s
           JOIN component_standards cs ON cs.standard_id = s.id
           WHERE cs.component_id = ?1
           ORDER BY s.name, s.rowid"#,
    )?;
    let rows = stmt.query_map(params![component], standard_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Store {
    pub fn create_standard(&mut self, standard: &Standard) -> Result<Standard, StoreError> {
        standard.validate()?;
        let standard = self.write(|tx| {
            tx.execute(
                "INSERT INTO standards (id, name, code, description, created, modified) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    standard.id,
                    standard.name.trim(),
                    standard.code.trim(),
                    standard.description,
                    standard.created,
                    standard.modified
                ],
            )
            .map_err(|e| map_unique(e, "standard"))?;
            fetch_standard(tx, &standard.id)
        })?;
        tracing::debug!(id = %standard.id, code = %standard.code, "created standard");
        Ok(standard)
    }

    pub fn get_standard(&self, id: &EntityId) -> Result<Standard, StoreError> {
        fetch_standard(&self.conn, id)
    }

    pub fn list_standards(&self) -> Result<Vec<Standard>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM standards ORDER BY name, rowid",
            STANDARD_COLUMNS
        ))?;
        let rows = stmt.query_map([], standard_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_standard(&mut self, standard: &Standard) -> Result<Standard, StoreError> {
        standard.validate()?;
        self.write(|tx| {
            let affected = tx
                .execute(
                    "UPDATE standards SET name = ?2, code = ?3, description = ?4, modified = ?5 WHERE id = ?1",
                    params![
                        standard.id,
                        standard.name.trim(),
                        standard.code.trim(),
                        standard.description,
                        Utc::now()
                    ],
                )
                .map_err(|e| map_unique(e, "standard"))?;
            expect_affected(affected, &standard.id)?;
            fetch_standard(tx, &standard.id)
        })
    }

    /// Delete a standard and its requirements
    pub fn delete_standard(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("standard", "id", id, EntityPrefix::Std)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM standards WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted standard");
        Ok(())
    }
}

// =========================================================================
// Requirements
// =========================================================================

const REQUIREMENT_COLUMNS: &str = "id, standard_id, definition, name, code, created, modified";

fn requirement_from_row(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    Ok(Requirement {
        id: row.get(0)?,
        standard: row.get(1)?,
        definition: row.get(2)?,
        name: row.get(3)?,
        code: row.get(4)?,
        created: row.get(5)?,
        modified: row.get(6)?,
    })
}

fn fetch_requirement(conn: &Connection, id: &EntityId) -> Result<Requirement, StoreError> {
    expect_prefix("requirement", "id", id, EntityPrefix::Req)?;
    conn.query_row(
        &format!("SELECT {} FROM requirements WHERE id = ?1", REQUIREMENT_COLUMNS),
        params![id],
        requirement_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("requirement", id))
}

/// Requirements of a standard in creation order
pub(crate) fn requirements_of_standard(
    conn: &Connection,
    standard: &EntityId,
) -> Result<Vec<Requirement>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM requirements WHERE standard_id = ?1 ORDER BY created, rowid",
        REQUIREMENT_COLUMNS
    ))?;
    let rows = stmt.query_map(params![standard], requirement_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl Store {
    pub fn create_requirement(
        &mut self,
        requirement: &Requirement,
    ) -> Result<Requirement, StoreError> {
        requirement.validate()?;
        let requirement = self.write(|tx| {
            ensure_exists(tx, &requirement.standard)?;
            tx.execute(
                "INSERT INTO requirements (id, standard_id, definition, name, code, created, modified) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    requirement.id,
                    requirement.standard,
                    requirement.definition.trim(),
                    requirement.name.trim(),
                    requirement.code.trim(),
                    requirement.created,
                    requirement.modified
                ],
            )
            .map_err(|e| map_unique(e, "requirement"))?;
            fetch_requirement(tx, &requirement.id)
        })?;
        tracing::debug!(id = %requirement.id, standard = %requirement.standard, "created requirement");
        Ok(requirement)
    }

    pub fn get_requirement(&self, id: &EntityId) -> Result<Requirement, StoreError> {
        fetch_requirement(&self.conn, id)
    }

    /// Requirements in creation order, optionally only those of one standard
    pub fn list_requirements(
        &self,
        standard: Option<&EntityId>,
    ) -> Result<Vec<Requirement>, StoreError> {
        match standard {
            Some(std_id) => {
                fetch_standard(&self.conn, std_id)?;
                requirements_of_standard(&self.conn, std_id)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM requirements ORDER BY created, rowid",
                    REQUIREMENT_COLUMNS
                ))?;
                let rows = stmt.query_map([], requirement_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            }
        }
    }

    pub fn update_requirement(
        &mut self,
        requirement: &Requirement,
    ) -> Result<Requirement, StoreError> {
        requirement.validate()?;
        self.write(|tx| save_requirement(tx, requirement))
    }

    pub fn delete_requirement(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("requirement", "id", id, EntityPrefix::Req)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM requirements WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted requirement");
        Ok(())
    }
}

/// Full-record update of a requirement inside an open transaction
pub(crate) fn save_requirement(
    conn: &Connection,
    requirement: &Requirement,
) -> Result<Requirement, StoreError> {
    ensure_exists(conn, &requirement.standard)?;
    let affected = conn
        .execute(
            r#"UPDATE requirements SET standard_id = ?2, definition = ?3, name = ?4, code = ?5,
                  modified = ?6
               WHERE id = ?1"#,
            params![
                requirement.id,
                requirement.standard,
                requirement.definition.trim(),
                requirement.name.trim(),
                requirement.code.trim(),
                Utc::now()
            ],
        )
        .map_err(|e| map_unique(e, "requirement"))?;
    expect_affected(affected, &requirement.id)?;
    tracing::debug!(id = %requirement.id, "updated requirement");
    fetch_requirement(conn, &requirement.id)
}

// =========================================================================
// Activities
// =========================================================================

const ACTIVITY_COLUMNS: &str = "id, name, description, created, modified";

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created: row.get(3)?,
        modified: row.get(4)?,
    })
}

fn fetch_activity(conn: &Connection, id: &EntityId) -> Result<Activity, StoreError> {
    expect_prefix("activity", "id", id, EntityPrefix::Act)?;
    conn.query_row(
        &format!("SELECT {} FROM activities WHERE id = ?1", ACTIVITY_COLUMNS),
        params![id],
        activity_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("activity", id))
}

impl Store {
    pub fn create_activity(&mut self, activity: &Activity) -> Result<Activity, StoreError> {
        activity.validate()?;
        let activity = self.write(|tx| {
            tx.execute(
                "INSERT INTO activities (id, name, description, created, modified) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    activity.id,
                    activity.name.trim(),
                    activity.description,
                    activity.created,
                    activity.modified
                ],
            )?;
            fetch_activity(tx, &activity.id)
        })?;
        tracing::debug!(id = %activity.id, name = %activity.name, "created activity");
        Ok(activity)
    }

    pub fn get_activity(&self, id: &EntityId) -> Result<Activity, StoreError> {
        fetch_activity(&self.conn, id)
    }

    pub fn list_activities(&self) -> Result<Vec<Activity>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM activities ORDER BY name, rowid",
            ACTIVITY_COLUMNS
        ))?;
        let rows = stmt.query_map([], activity_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_activity(&mut self, activity: &Activity) -> Result<Activity, StoreError> {
        activity.validate()?;
        self.write(|tx| save_activity(tx, activity))
    }

    /// Delete an activity with its executions, requirement links and owned links
    pub fn delete_activity(&mut self, id: &EntityId) -> Result<(), StoreError> {
        expect_prefix("activity", "id", id, EntityPrefix::Act)?;
        self.write(|tx| {
            let affected = tx.execute("DELETE FROM activities WHERE id = ?1", params![id])?;
            expect_affected(affected, id)
        })?;
        tracing::debug!(id = %id, "deleted activity");
        Ok(())
    }
}

pub(crate) fn save_activity(conn: &Connection, activity: &Activity) -> Result<Activity, StoreError> {
    let affected = conn.execute(
        "UPDATE activities SET name = ?2, description = ?3, modified = ?4 WHERE id = ?1",
        params![activity.id, activity.name.trim(), activity.description, Utc::now()],
    )?;
    expect_affected(affected, &activity.id)?;
    tracing::debug!(id = %activity.id, "updated activity");
    fetch_activity(conn, &activity.id)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[test]
    fn test_standard_name_and_code_unique() {
        let mut store = fixtures::store();
        fixtures::standard(&mut store, "FIPS 140-3", "FIPS-140-3");

        let err = store
            .create_standard(&Standard::new("FIPS 140-3", "OTHER"))
            .unwrap_err();
        assert_eq!(err.field(), Some("name"));

        let err = store
            .create_standard(&Standard::new("Other", "FIPS-140-3"))
            .unwrap_err();
        assert_eq!(err.field(), Some("code"));

        assert_eq!(store.list_standards().unwrap().len(), 1);
    }

    #[test]
    fn test_requirement_definition_unique_per_standard() {
        let mut store = fixtures::store();
        let a = fixtures::standard(&mut store, "A", "A");
        let b = fixtures::standard(&mut store, "B", "B");
        fixtures::requirement(&mut store, &a, "Encrypt data at rest");

        let err = store
            .create_requirement(&Requirement::new(a.id.clone(), "Encrypt data at rest"))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("definition"));

        // Same definition under a different standard is fine
        fixtures::requirement(&mut store, &b, "Encrypt data at rest");
        assert_eq!(store.list_requirements(None).unwrap().len(), 2);
    }

    #[test]
    fn test_requirements_listed_in_creation_order() {
        let mut store = fixtures::store();
        let std = fixtures::standard(&mut store, "NIST", "800-53");
        fixtures::requirement(&mut store, &std, "Zeta control");
        fixtures::requirement(&mut store, &std, "Alpha control");
        fixtures::requirement(&mut store, &std, "Mu control");

        let defs: Vec<String> = store
            .list_requirements(Some(&std.id))
            .unwrap()
            .into_iter()
            .map(|r| r.definition)
            .collect();
        assert_eq!(defs, vec!["Zeta control", "Alpha control", "Mu control"]);
    }

    #[test]
    fn test_requirement_for_missing_standard_is_not_found() {
        let mut store = fixtures::store();
        let err = store
            .create_requirement(&Requirement::new(EntityId::new(EntityPrefix::Std), "x"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_deleting_standard_removes_requirements() {
        let mut store = fixtures::store();
        let std = fixtures::standard(&mut store, "NIST", "800-53");
        fixtures::requirement(&mut store, &std, "AC-1");
        fixtures::requirement(&mut store, &std, "AC-2");

        store.delete_standard(&std.id).unwrap();
        assert!(store.list_requirements(None).unwrap().is_empty());
    }

    #[test]
    fn test_activity_names_need_not_be_unique() {
        let mut store = fixtures::store();
        fixtures::activity(&mut store, "Threat model");
        fixtures::activity(&mut store, "Threat model");
        assert_eq!(store.list_activities().unwrap().len(), 2);
    }
}
