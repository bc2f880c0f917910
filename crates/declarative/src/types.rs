//! Core types for declarative reconciliation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Whether a resource should exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnsureState {
    /// The resource should exist and match the desired parameters
    #[default]
    Present,
    /// The resource should not exist
    Absent,
}

impl EnsureState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    /// Check if state represents absence
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for EnsureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::Absent => "absent",
        })
    }
}

/// The single corrective action computed for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Already converged
    None,
    /// Resource was (or would be) created
    Created,
    /// Resource was (or would be) updated
    Updated,
    /// Resource was (or would be) deleted
    Deleted,
}

impl Action {
    /// Check if the action represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        })
    }
}

/// One field-level difference that drove an update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    /// Local parameter name
    pub param: String,
    /// Remote field name
    pub field: String,
    /// Value currently reported by Jira (`null` when missing)
    pub from: Value,
    /// Desired value
    pub to: Value,
    /// Encoded value written to the update payload
    #[serde(skip)]
    pub send: Value,
}

/// Result of reconciling one resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Resource kind, e.g. `project`
    pub kind: String,
    /// Natural key of the resource
    pub name: String,
    /// Last known remote representation, `null` when absent
    pub snapshot: Option<Value>,
    /// Computed action
    pub action: Action,
    /// `action != none`
    pub changed: bool,
    /// Field differences behind an update
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    /// Whether the action was only computed, not applied
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl Outcome {
    /// Create an outcome; `changed` follows from `action`.
    pub fn new(kind: impl Into<String>, name: impl Into<String>, snapshot: Option<Value>, action: Action) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            snapshot,
            action,
            changed: action.is_change(),
            changes: Vec::new(),
            dry_run: false,
        }
    }

    /// Attach field differences.
    #[must_use]
    pub fn with_changes(mut self, changes: Vec<Change>) -> Self {
        self.changes = changes;
        self
    }

    /// Mark as computed in dry-run mode.
    #[must_use]
    pub fn simulated(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// `kind.name`, as used for target filtering and display
    pub fn id(&self) -> String {
        format!("{}.{}", self.kind, self.name)
    }
}

/// A resource that could not be reconciled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Resource kind
    pub kind: String,
    /// Natural key of the resource
    pub name: String,
    /// Error message, verbatim
    pub error: String,
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted + self.unchanged + self.failed + self.skipped
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ExecuteSummary) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    /// Add an action to the summary
    pub fn add_action(&mut self, action: Action) {
        match action {
            Action::None => self.unchanged += 1,
            Action::Created => self.created += 1,
            Action::Updated => self.updated += 1,
            Action::Deleted => self.deleted += 1,
        }
    }
}

/// Options for a single reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Compute the action without mutating anything
    pub dry_run: bool,
}

/// Options for executing a plan
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Record failures and continue with the next resource
    pub keep_going: bool,
}

impl ExecuteOptions {
    /// Options passed to each reconciliation
    pub fn reconcile(&self) -> ReconcileOptions {
        ReconcileOptions {
            dry_run: self.dry_run,
        }
    }
}
