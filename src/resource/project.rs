//! Jira project resource

use declarative::{
    Address, Compare, Create, DesiredState, EnsureState, Error, Field, FieldMapping, Lookup, Removal, Resource,
    ResourceKind, Result,
};
use jirakit::{Query, Transport, endpoints};
use serde::{Deserialize, Serialize};

const EXPAND: &str = "description,lead,url,projectKeys";

/// A Jira project, addressed by `key`
///
/// Exactly one of `project_type_key` and `project_template_key` must be
/// given when the project should exist. Scheme ids are compared against
/// the project's scheme sub-resources; the workflow scheme is only sent on
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_template_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_security_scheme: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_scheme: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_scheme: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_scheme_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub state: EnsureState,
}

impl Project {
    fn mapping() -> Result<FieldMapping> {
        FieldMapping::new(vec![
            Field::new("name", "name"),
            Field::new("key", "key"),
            Field::new("project_type_key", "projectTypeKey"),
            Field::new("project_template_key", "projectTemplateKey"),
            Field::new("description", "description")
                .updatable()
                .compare(Compare::NullableText),
            Field::new("lead", "lead").updatable().compare(Compare::NamedObject),
            Field::new("url", "url").updatable(),
            Field::new("avatar_id", "avatarId").updatable(),
            Field::new("issue_security_scheme", "issueSecurityScheme")
                .updatable()
                .compare(Compare::Resolved {
                    suffix: "issuesecuritylevelscheme",
                }),
            Field::new("permission_scheme", "permissionScheme")
                .updatable()
                .compare(Compare::Resolved {
                    suffix: "permissionscheme",
                }),
            Field::new("notification_scheme", "notificationScheme")
                .updatable()
                .compare(Compare::Resolved {
                    suffix: "notificationscheme",
                }),
            Field::new("workflow_scheme_id", "workflowSchemeId"),
            Field::new("category_id", "categoryId")
                .updatable()
                .read_from("projectCategory")
                .compare(Compare::Nested { key: "id" }),
        ])
    }

    fn path(&self) -> String {
        endpoints::item(endpoints::PROJECT, &self.key)
    }
}

impl Resource for Project {
    fn kind(&self) -> &'static str {
        "project"
    }

    fn name(&self) -> String {
        self.key.clone()
    }

    fn desired(&self) -> Result<DesiredState> {
        let desired = super::desired_of(self.kind(), self)?;
        super::require(self.kind(), "name", self.name.as_ref(), &desired)?;
        super::require(self.kind(), "lead", self.lead.as_ref(), &desired)?;

        if desired.state.is_present() {
            match (&self.project_type_key, &self.project_template_key) {
                (Some(_), Some(_)) => {
                    return Err(Error::invalid(
                        self.kind(),
                        "project_type_key",
                        "mutually exclusive with project_template_key",
                    ));
                }
                (None, None) => {
                    return Err(Error::invalid(
                        self.kind(),
                        "project_type_key",
                        "one of project_type_key or project_template_key is required",
                    ));
                }
                _ => {}
            }
        }

        Ok(desired)
    }

    fn descriptor(&self, _transport: &dyn Transport) -> Result<ResourceKind> {
        Ok(ResourceKind::new(
            self.kind(),
            &self.key,
            Self::mapping()?,
            Lookup::Direct(Address::new(self.path()).with_query(Query::new().with("expand", EXPAND))),
            Create::post(endpoints::PROJECT).extra("assigneeType", "PROJECT_LEAD"),
        )
        .companion("lead", "assigneeType", "PROJECT_LEAD")
        .removal(Removal::Delete(Some(Address::new(self.path())))))
    }
}
