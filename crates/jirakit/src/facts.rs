//! Read-only lookups ("facts").
//!
//! A fact exposes remote state without reconciling it: one GET (or the
//! JQL search POST) whose result is handed back as-is. Facts deserialize
//! from a flat map tagged with `fact`, so they can come straight from a
//! manifest or from `--set key=value` pairs.

use crate::endpoints;
use crate::error::{Error, Result};
use crate::transport::{Fetched, Method, Query, Request, Transport};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

/// A read-only lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case", deny_unknown_fields)]
pub enum Fact {
    /// A project by id or key.
    GetProject {
        /// Project id or key.
        #[serde(deserialize_with = "text")]
        project: String,
        /// Entities to expand, e.g. `description`, `lead`.
        #[serde(default)]
        expand: Vec<String>,
    },
    /// A user by username or key.
    GetUser {
        /// Username to look up.
        #[serde(default)]
        username: Option<String>,
        /// User key to look up.
        #[serde(default)]
        key: Option<String>,
    },
    /// A group and its members.
    GetGroup {
        /// Group name.
        group_name: String,
        /// Include inactive members.
        #[serde(default)]
        include_inactive_users: Option<bool>,
        /// Maximum number of members returned.
        #[serde(default)]
        max_results: Option<u32>,
    },
    /// A project role by id or name.
    GetRole {
        /// Role id.
        #[serde(default, deserialize_with = "optional_text")]
        id: Option<String>,
        /// Role name, resolved to an id first.
        #[serde(default)]
        name: Option<String>,
    },
    /// An issue type by id.
    GetIssueType {
        /// Issue type id.
        #[serde(deserialize_with = "text")]
        id: String,
    },
    /// A project type by key.
    GetProjectType {
        /// Project type key, e.g. `business`.
        key: String,
    },
    /// A permission scheme by id.
    GetPermissionScheme {
        /// Scheme id.
        #[serde(deserialize_with = "text")]
        id: String,
    },
    /// A notification scheme by id.
    GetNotificationScheme {
        /// Scheme id.
        #[serde(deserialize_with = "text")]
        id: String,
    },
    /// A workflow scheme by id.
    GetWorkflowScheme {
        /// Scheme id.
        #[serde(deserialize_with = "text")]
        id: String,
    },
    /// All projects.
    ListProjects {
        /// Entities to expand.
        #[serde(default)]
        expand: Vec<String>,
        /// Include archived projects.
        #[serde(default)]
        include_archived: Option<bool>,
    },
    /// Users matching a search string.
    ListUsers {
        /// Search string; `.` matches everyone.
        #[serde(default = "default_user_search")]
        username: String,
        /// Include active users.
        #[serde(default = "default_true")]
        include_active: bool,
        /// Include inactive users.
        #[serde(default)]
        include_inactive: bool,
    },
    /// Groups matching a search string.
    ListGroups {
        /// Substring to match group names against.
        #[serde(default)]
        query: Option<String>,
        /// Group name to exclude.
        #[serde(default)]
        exclude: Option<String>,
        /// Only groups this user belongs to.
        #[serde(default)]
        username: Option<String>,
    },
    /// All project roles.
    ListRoles,
    /// All issue types.
    ListIssueTypes,
    /// All workflows.
    ListWorkflows,
    /// All permission schemes.
    ListPermissionSchemes,
    /// All notification schemes.
    ListNotificationSchemes,
    /// All issue security schemes.
    ListIssueSecuritySchemes,
    /// Run a JQL search.
    Jql {
        /// The JQL query.
        jql: String,
        /// Fields to return; all when empty.
        #[serde(default)]
        fields: Vec<String>,
        /// Maximum number of issues returned.
        #[serde(default)]
        max_results: Option<u32>,
        /// Whether Jira validates the query.
        #[serde(default)]
        validate_query: Option<bool>,
    },
}

fn default_user_search() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

impl Fact {
    /// Name of this fact, as used in manifests and on the command line.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetProject { .. } => "get_project",
            Self::GetUser { .. } => "get_user",
            Self::GetGroup { .. } => "get_group",
            Self::GetRole { .. } => "get_role",
            Self::GetIssueType { .. } => "get_issue_type",
            Self::GetProjectType { .. } => "get_project_type",
            Self::GetPermissionScheme { .. } => "get_permission_scheme",
            Self::GetNotificationScheme { .. } => "get_notification_scheme",
            Self::GetWorkflowScheme { .. } => "get_workflow_scheme",
            Self::ListProjects { .. } => "list_projects",
            Self::ListUsers { .. } => "list_users",
            Self::ListGroups { .. } => "list_groups",
            Self::ListRoles => "list_roles",
            Self::ListIssueTypes => "list_issue_types",
            Self::ListWorkflows => "list_workflows",
            Self::ListPermissionSchemes => "list_permission_schemes",
            Self::ListNotificationSchemes => "list_notification_schemes",
            Self::ListIssueSecuritySchemes => "list_issue_security_schemes",
            Self::Jql { .. } => "jql",
        }
    }

    /// Build the request for facts that need no prior lookup.
    ///
    /// `GetRole` by name needs a lookup first and is handled in
    /// [`Fact::gather`]; here it requires an id.
    pub fn request(&self) -> Result<Request> {
        let expand_all = || Query::new().with("expand", "all");

        let request = match self {
            Self::GetProject { project, expand } => {
                let query = if expand.is_empty() {
                    Query::new()
                } else {
                    Query::new().with("expand", expand.join(","))
                };
                Request::new(Method::Get, endpoints::item(endpoints::PROJECT, project))
                    .with_query(query)
            }
            Self::GetUser { username, key } => {
                let query = match (username, key) {
                    (Some(_), Some(_)) => {
                        return Err(Error::Configuration(
                            "username and key are mutually exclusive".to_string(),
                        ));
                    }
                    (None, None) => {
                        return Err(Error::Configuration(
                            "one of username or key is required".to_string(),
                        ));
                    }
                    (Some(u), None) => Query::new().with("username", u),
                    (None, Some(k)) => Query::new().with("key", k),
                };
                Request::new(Method::Get, endpoints::USER)
                    .with_query(query.with("expand", "groups,applicationRoles"))
            }
            Self::GetGroup {
                group_name,
                include_inactive_users,
                max_results,
            } => Request::new(Method::Get, endpoints::GROUP_MEMBER).with_query(
                Query::new()
                    .with("groupname", group_name)
                    .with_opt("includeInactiveUsers", *include_inactive_users)
                    .with_opt("maxResults", *max_results),
            ),
            Self::GetRole { id, .. } => {
                let id = id.as_ref().ok_or_else(|| {
                    Error::Configuration("one of id or name is required".to_string())
                })?;
                Request::new(Method::Get, endpoints::item(endpoints::ROLE, id))
            }
            Self::GetIssueType { id } => {
                Request::new(Method::Get, endpoints::item(endpoints::ISSUE_TYPE, id))
                    .with_query(expand_all())
            }
            Self::GetProjectType { key } => {
                Request::new(Method::Get, endpoints::item(endpoints::PROJECT_TYPE, key))
            }
            Self::GetPermissionScheme { id } => {
                Request::new(Method::Get, endpoints::item(endpoints::PERMISSION_SCHEME, id))
                    .with_query(expand_all())
            }
            Self::GetNotificationScheme { id } => {
                Request::new(Method::Get, endpoints::item(endpoints::NOTIFICATION_SCHEME, id))
                    .with_query(expand_all())
            }
            Self::GetWorkflowScheme { id } => {
                Request::new(Method::Get, endpoints::item(endpoints::WORKFLOW_SCHEME, id))
            }
            Self::ListProjects {
                expand,
                include_archived,
            } => {
                let mut query = Query::new();
                if !expand.is_empty() {
                    query.push("expand", expand.join(","));
                }
                Request::new(Method::Get, endpoints::PROJECT)
                    .with_query(query.with_opt("includeArchived", *include_archived))
            }
            Self::ListUsers {
                username,
                include_active,
                include_inactive,
            } => Request::new(Method::Get, endpoints::USER_SEARCH).with_query(
                Query::new()
                    .with("username", username)
                    .with("includeActive", include_active)
                    .with("includeInactive", include_inactive),
            ),
            Self::ListGroups {
                query,
                exclude,
                username,
            } => Request::new(Method::Get, endpoints::GROUPS_PICKER).with_query(
                Query::new()
                    .with_opt("query", query.as_deref().filter(|s| !s.is_empty()))
                    .with_opt("exclude", exclude.as_deref().filter(|s| !s.is_empty()))
                    .with_opt("username", username.as_deref().filter(|s| !s.is_empty())),
            ),
            Self::ListRoles => Request::new(Method::Get, endpoints::ROLE),
            Self::ListIssueTypes => Request::new(Method::Get, endpoints::ISSUE_TYPE),
            Self::ListWorkflows => Request::new(Method::Get, endpoints::WORKFLOW),
            Self::ListPermissionSchemes => {
                Request::new(Method::Get, endpoints::PERMISSION_SCHEME).with_query(expand_all())
            }
            Self::ListNotificationSchemes => {
                Request::new(Method::Get, endpoints::NOTIFICATION_SCHEME).with_query(expand_all())
            }
            Self::ListIssueSecuritySchemes => {
                Request::new(Method::Get, endpoints::ISSUE_SECURITY_SCHEMES)
            }
            Self::Jql {
                jql,
                fields,
                max_results,
                validate_query,
            } => {
                let mut body = json!({ "jql": jql });
                if !fields.is_empty() {
                    body["fields"] = json!(fields.join(","));
                }
                if let Some(max) = max_results {
                    body["maxResults"] = json!(max);
                }
                if let Some(validate) = validate_query {
                    body["validateQuery"] = json!(validate);
                }
                Request::new(Method::Post, endpoints::SEARCH).with_body(body)
            }
        };

        Ok(request)
    }

    /// Run the lookup.
    pub fn gather<T: Transport + ?Sized>(&self, transport: &T) -> Result<Fetched<Value>> {
        if let Self::GetRole { id: None, name: Some(name) } = self {
            return match resolve_id(transport, endpoints::ROLE, name)? {
                Some(id) => transport.get(&endpoints::item(endpoints::ROLE, id), &Query::new()),
                None => Ok(Fetched::Absent),
            };
        }

        let fetched = transport.request(&self.request()?)?;

        Ok(match self {
            Self::GetGroup { group_name, .. } => fetched.map(|mut group| {
                if let Some(obj) = group.as_object_mut() {
                    obj.insert("name".to_string(), json!(group_name));
                }
                group
            }),
            Self::ListGroups { .. } => {
                fetched.map(|picker| picker.get("groups").cloned().unwrap_or_else(|| json!([])))
            }
            _ => fetched,
        })
    }
}

/// Resolve a human-readable name to an id by scanning a collection.
///
/// The collection must be a JSON array of objects with `name` and `id`.
/// The first exact match wins. An absent collection resolves to `None`.
pub fn resolve_id<T: Transport + ?Sized>(
    transport: &T,
    collection: &str,
    name: &str,
) -> Result<Option<String>> {
    let Fetched::Found(items) = transport.get(collection, &Query::new())? else {
        return Ok(None);
    };

    let items = items.as_array().ok_or_else(|| {
        Error::InvalidResponse(format!("expected a list from {collection}"))
    })?;

    Ok(items
        .iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|item| item.get("id"))
        .map(id_string))
}

/// An id or key given either as a string or as a number.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(id_string(&Value::deserialize(deserializer)?))
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .filter(|v| !v.is_null())
        .map(|v| id_string(&v)))
}

/// Render a JSON id (number or string) for use in a path.
#[must_use]
pub fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
