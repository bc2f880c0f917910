//! Jira project role resource

use declarative::{
    Confirm, Create, DesiredState, EnsureState, Field, FieldMapping, Lookup, Resource, ResourceKind, Result,
};
use jirakit::{Method, Transport, endpoints};
use serde::{Deserialize, Serialize};

/// A global project role, located by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Role {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub state: EnsureState,
}

impl Resource for Role {
    fn kind(&self) -> &'static str {
        "role"
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn desired(&self) -> Result<DesiredState> {
        super::desired_of(self.kind(), self)
    }

    fn descriptor(&self, _transport: &dyn Transport) -> Result<ResourceKind> {
        let fields = FieldMapping::new(vec![
            Field::new("name", "name"),
            Field::new("description", "description").updatable(),
        ])?;

        // Role updates go through the partial-update endpoint.
        Ok(ResourceKind::new(
            self.kind(),
            &self.name,
            fields,
            Lookup::ByName {
                collection: endpoints::ROLE.to_string(),
                name: self.name.clone(),
            },
            Create::post(endpoints::ROLE),
        )
        .confirm(Confirm::Response)
        .update_method(Method::Post))
    }
}
