//! Jira project category resource

use declarative::{
    Confirm, Create, DesiredState, EnsureState, Field, FieldMapping, Lookup, Resource, ResourceKind, Result,
};
use jirakit::{Transport, endpoints};
use serde::{Deserialize, Serialize};

/// A project category, located by name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectCategory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub state: EnsureState,
}

impl Resource for ProjectCategory {
    fn kind(&self) -> &'static str {
        "project_category"
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

        Ok(ResourceKind::new(
            self.kind(),
            &self.name,
            fields,
            Lookup::ByName {
                collection: endpoints::PROJECT_CATEGORY.to_string(),
                name: self.name.clone(),
            },
            Create::post(endpoints::PROJECT_CATEGORY),
        )
        .confirm(Confirm::Response))
    }
}
