//! # Declarative
//!
//! Declarative reconciliation of remote Jira resources.
//!
//! This crate provides the core abstractions for declaring desired state,
//! fetching the current remote state, and converging it in one idempotent
//! pass per resource.
//!
//! ## Core Concepts
//!
//! - **FieldMapping**: typed table of local parameter ↔ remote field rows
//! - **ResourceKind**: descriptor (mapping, addressing, write strategy) for one resource type
//! - **DesiredState**: parameter values plus `state: present|absent`
//! - **reconcile**: fetch → classify → apply → confirm → report
//! - **ExecutionPlan**: an ordered list of resources, run by [`execute`]
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     Action, Address, Create, DesiredState, Field, FieldMapping, Lookup,
//!     ReconcileOptions, ResourceKind, reconcile,
//! };
//! use jirakit::{Method, MockTransport, Query};
//! use serde_json::json;
//!
//! let fields = FieldMapping::new(vec![Field::new("group_name", "name")]).unwrap();
//! let kind = ResourceKind::new(
//!     "group",
//!     "g1",
//!     fields,
//!     Lookup::Direct(
//!         Address::new("rest/api/2/group/member").with_query(Query::new().with("groupname", "g1")),
//!     ),
//!     Create::post("rest/api/2/group"),
//! );
//!
//! let mut mock = MockTransport::new();
//! mock.absent(Method::Get, "rest/api/2/group/member")
//!     .found(Method::Get, "rest/api/2/group/member", json!({"values": []}))
//!     .found(Method::Post, "rest/api/2/group", json!({"name": "g1"}));
//!
//! let desired = DesiredState::default().with("group_name", "g1");
//! let outcome = reconcile(&mock, &kind, &desired, &ReconcileOptions::default()).unwrap();
//! assert_eq!(outcome.action, Action::Created);
//! ```
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod planner;
pub mod reconcile;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{compute_changes, update_payload};
pub use error::{Error, Result};
pub use executor::{ExecuteReport, apply_resource, execute, execute_simple};
pub use mapping::{Compare, Encode, Field, FieldMapping};
pub use planner::ExecutionPlan;
pub use reconcile::{fetch, reconcile};
pub use resource::{
    Address, BoxedResource, Companion, Confirm, Create, DesiredState, Lookup, Projection, Removal, Resource,
    ResourceKind, Update,
};
pub use types::{
    Action, Change, EnsureState, ExecuteOptions, ExecuteSummary, Failure, Outcome, ReconcileOptions,
};
