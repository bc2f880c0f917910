//! Users and groups holding a role in a project

use declarative::{
    Address, Compare, Create, DesiredState, EnsureState, Error, Field, FieldMapping, Lookup, Projection, Removal, Resource,
    ResourceKind, Result,
};
use jirakit::{Error as JiraError, Method, Transport, endpoints, resolve_id};
use serde::{Deserialize, Serialize};
use serde_json::json;

const USER_ACTOR: &str = "atlassian-user-role-actor";
const GROUP_ACTOR: &str = "atlassian-group-role-actor";

/// The actors of one role in one project
///
/// Memberships are attached to the project: they are replaced as a whole
/// on every change, and removing one clears both actor lists. The role is
/// given by name (resolved through `role`) or directly by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRoleMembership {
    pub project_key: String,
    #[serde(default, alias = "role_name", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub state: EnsureState,
}

impl Resource for ProjectRoleMembership {
    fn kind(&self) -> &'static str {
        "project_role_membership"
    }

    fn name(&self) -> String {
        match (&self.role, self.role_id) {
            (Some(role), _) => format!("{}.{role}", self.project_key),
            (None, Some(id)) => format!("{}.{id}", self.project_key),
            (None, None) => self.project_key.clone(),
        }
    }

    fn desired(&self) -> Result<DesiredState> {
        if self.role.is_some() == self.role_id.is_some() {
            return Err(Error::invalid(self.kind(), "role", "exactly one of role or role_id is required"));
        }
        super::desired_of(self.kind(), self)
    }

    fn descriptor(&self, transport: &dyn Transport) -> Result<ResourceKind> {
        let role_id = match (&self.role, self.role_id) {
            (_, Some(id)) => id.to_string(),
            (Some(role), None) => {
                resolve_id(transport, endpoints::ROLE, role)?.ok_or_else(|| JiraError::not_found("role", role))?
            }
            (None, None) => {
                return Err(Error::invalid(self.kind(), "role", "exactly one of role or role_id is required"));
            }
        };

        let fields = FieldMapping::new(vec![
            Field::new("users", USER_ACTOR)
                .updatable()
                .read_from("users")
                .compare(Compare::Set),
            Field::new("groups", GROUP_ACTOR)
                .updatable()
                .read_from("groups")
                .compare(Compare::Set),
        ])?;
        let address = Address::new(endpoints::project_role(&self.project_key, role_id));

        Ok(ResourceKind::new(
            self.kind(),
            self.name(),
            fields,
            Lookup::Direct(address.clone()),
            Create::with_method(Method::Put, address),
        )
        .projection(Projection::RoleActors)
        .envelope("categorisedActors")
        .full_update()
        .removal(Removal::Clear(json!({
            "categorisedActors": { USER_ACTOR: [], GROUP_ACTOR: [] }
        }))))
    }
}
