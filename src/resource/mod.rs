//! Jira resource types
//!
//! Every manifest entry is a typed spec that knows its desired state and
//! how to build the descriptor the generic reconciler consumes:
//! - `desired()` serializes the spec into parameters plus `state`
//! - `descriptor()` runs required name lookups and returns a `ResourceKind`

mod group;
mod issue;
mod project;
mod project_category;
mod project_role_membership;
mod role;
mod user;
mod user_group_membership;
mod workflow_scheme;

pub use group::Group;
pub use issue::Issue;
pub use project::Project;
pub use project_category::ProjectCategory;
pub use project_role_membership::ProjectRoleMembership;
pub use role::Role;
pub use user::User;
pub use user_group_membership::UserGroupMembership;
pub use workflow_scheme::WorkflowScheme;

use declarative::{BoxedResource, DesiredState, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every kind a manifest can declare, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSpec {
    Group(Group),
    User(User),
    Project(Project),
    ProjectCategory(ProjectCategory),
    Role(Role),
    Issue(Issue),
    WorkflowScheme(WorkflowScheme),
    UserGroupMembership(UserGroupMembership),
    ProjectRoleMembership(ProjectRoleMembership),
}

/// Names accepted as `kind`
pub const KINDS: &[&str] = &[
    "group",
    "user",
    "project",
    "project_category",
    "role",
    "issue",
    "workflow_scheme",
    "user_group_membership",
    "project_role_membership",
];

impl ResourceSpec {
    /// Parse a spec from a kind and a JSON object of parameters.
    pub fn from_params(kind: &str, params: Value) -> Result<Self> {
        if !KINDS.contains(&kind) {
            return Err(Error::invalid(kind, "kind", format!("expected one of: {}", KINDS.join(", "))));
        }
        let Value::Object(mut map) = params else {
            return Err(Error::invalid(kind, "*", "parameters must be an object"));
        };
        map.insert("kind".to_string(), Value::String(kind.to_string()));
        serde_json::from_value(Value::Object(map)).map_err(|e| Error::invalid(kind, "*", e.to_string()))
    }

    /// Erase the concrete type for the execution plan.
    pub fn into_resource(self) -> BoxedResource {
        match self {
            Self::Group(r) => Box::new(r),
            Self::User(r) => Box::new(r),
            Self::Project(r) => Box::new(r),
            Self::ProjectCategory(r) => Box::new(r),
            Self::Role(r) => Box::new(r),
            Self::Issue(r) => Box::new(r),
            Self::WorkflowScheme(r) => Box::new(r),
            Self::UserGroupMembership(r) => Box::new(r),
            Self::ProjectRoleMembership(r) => Box::new(r),
        }
    }
}

/// Desired state of a spec: its serialized fields, with `state` split out.
fn desired_of<S: Serialize>(kind: &str, spec: &S) -> Result<DesiredState> {
    DesiredState::from_value(kind, serde_json::to_value(spec)?)
}

/// Fail when a present resource lacks a parameter it cannot be created without.
fn require<T>(kind: &str, param: &str, value: Option<&T>, desired: &DesiredState) -> Result<()> {
    if desired.state.is_present() && value.is_none() {
        return Err(Error::invalid(kind, param, "required when state is present"));
    }
    Ok(())
}
