//! Derived read-side structures returned by the store

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::identity::EntityId;
use crate::entities::{Campaign, Component, ComponentActivity, Requirement, Standard};

/// A selectable association target with a display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: EntityId,
    pub label: String,
}

/// Status counts for the work linked to one campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBuckets {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    /// `todo + in_progress`
    pub pending: usize,
}

impl StatusBuckets {
    pub fn new(todo: usize, in_progress: usize, done: usize) -> Self {
        Self {
            todo,
            in_progress,
            done,
            pending: todo + in_progress,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }
}

/// A campaign together with its status buckets
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    pub campaign: Campaign,
    pub buckets: StatusBuckets,
}

/// One requirement and the executions that satisfy it
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRow {
    pub requirement: Requirement,
    pub activities: Vec<ComponentActivity>,
}

impl ComplianceRow {
    pub fn is_gap(&self) -> bool {
        self.activities.is_empty()
    }
}

/// Per-requirement view of a standard for one component
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceMatrix {
    pub component: Component,
    pub standard: Standard,
    pub rows: Vec<ComplianceRow>,
}

impl ComplianceMatrix {
    /// Requirements with no executed activity for the component
    pub fn gaps(&self) -> Vec<&Requirement> {
        self.rows
            .iter()
            .filter(|row| row.is_gap())
            .map(|row| &row.requirement)
            .collect()
    }

    pub fn covered(&self) -> usize {
        self.rows.len() - self.gaps().len()
    }
}

/// Contact emails of the components a campaign touches, by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactRollup {
    pub engineering: BTreeSet<String>,
    pub business: BTreeSet<String>,
    pub psrd: BTreeSet<String>,
}

impl ContactRollup {
    /// Sorted union of all three roles
    pub fn emails(&self) -> Vec<String> {
        self.engineering
            .iter()
            .chain(&self.business)
            .chain(&self.psrd)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.engineering.is_empty() && self.business.is_empty() && self.psrd.is_empty()
    }
}
