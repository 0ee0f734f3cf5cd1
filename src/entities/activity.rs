//! Activity templates and their per-component executions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::validation::{self, NAME_MAX};

/// An assessment or review activity, independent of any component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for Activity {
    const PREFIX: EntityPrefix = EntityPrefix::Act;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        validation::name("activity", "name", &self.name, NAME_MAX)
    }
}

impl Activity {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Act),
            name: name.into(),
            description: description.into(),
            created: now,
            modified: now,
        }
    }
}

/// Execution schedule of an activity against a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_end: Option<NaiveDate>,
}

/// One execution of an activity against a component version, unique per pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentActivity {
    pub id: EntityId,

    pub component: EntityId,

    pub activity: EntityId,

    /// Component name, filled in by the store on read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component_name: String,

    /// Activity name, filled in by the store on read
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub activity_name: String,

    #[serde(default)]
    pub schedule: Schedule,

    #[serde(default)]
    pub status: Status,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub component_version: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Entity for ComponentActivity {
    const PREFIX: EntityPrefix = EntityPrefix::Cact;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} - {}", self.component_name, self.activity_name)
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.component.prefix() != EntityPrefix::Cmp {
            return Err(StoreError::validation(
                "component activity",
                "component",
                format!("expected a component id, got {}", self.component),
            ));
        }
        if self.activity.prefix() != EntityPrefix::Act {
            return Err(StoreError::validation(
                "component activity",
                "activity",
                format!("expected an activity id, got {}", self.activity),
            ));
        }
        validation::max_len(
            "component activity",
            "component_version",
            &self.component_version,
            NAME_MAX,
        )?;
        if let (Some(start), Some(end)) = (self.schedule.execution_start, self.schedule.execution_end)
        {
            if end < start {
                return Err(StoreError::validation(
                    "component activity",
                    "execution_end",
                    "execution end date is before the start date",
                ));
            }
        }
        Ok(())
    }
}

impl ComponentActivity {
    pub fn new(component: EntityId, activity: EntityId) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Cact),
            component,
            activity,
            component_name: String::new(),
            activity_name: String::new(),
            schedule: Schedule::default(),
            status: Status::default(),
            component_version: String::new(),
            created: now,
            modified: now,
        }
    }
}
