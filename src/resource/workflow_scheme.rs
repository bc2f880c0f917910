//! Jira workflow scheme resource

use declarative::{
    Address, Confirm, Create, DesiredState, EnsureState, Field, FieldMapping, Lookup, Resource, ResourceKind, Result,
};
use jirakit::{Transport, endpoints};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A workflow scheme, addressed by `id`
///
/// Workflow schemes are read-only once created: nothing is compared or
/// updated, only created and deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workflow: Option<String>,
    /// Issue type id to workflow name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type_mappings: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub state: EnsureState,
}

impl Resource for WorkflowScheme {
    fn kind(&self) -> &'static str {
        "workflow_scheme"
    }

    fn name(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => name.clone(),
            (None, None) => String::new(),
        }
    }

    fn desired(&self) -> Result<DesiredState> {
        let desired = super::desired_of(self.kind(), self)?;
        if self.id.is_none() {
            super::require(self.kind(), "name", self.name.as_ref(), &desired)?;
        }
        Ok(desired)
    }

    fn descriptor(&self, _transport: &dyn Transport) -> Result<ResourceKind> {
        let fields = FieldMapping::new(vec![
            Field::new("name", "name"),
            Field::new("description", "description"),
            Field::new("id", "id").skip_on_create(),
            Field::new("default_workflow", "defaultWorkflow"),
            Field::new("issue_type_mappings", "issueTypeMappings"),
        ])?;

        let lookup = match self.id {
            Some(id) => Lookup::Direct(Address::new(endpoints::item(endpoints::WORKFLOW_SCHEME, id))),
            None => Lookup::Unaddressed,
        };

        Ok(ResourceKind::new(
            self.kind(),
            self.name(),
            fields,
            lookup,
            Create::post(endpoints::WORKFLOW_SCHEME),
        )
        .confirm(Confirm::Response))
    }
}
