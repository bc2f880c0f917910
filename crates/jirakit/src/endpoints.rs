//! Jira REST v2 endpoint paths, relative to the server root.

#![allow(missing_docs)]

pub const GROUP: &str = "rest/api/2/group";
pub const GROUP_MEMBER: &str = "rest/api/2/group/member";
pub const GROUP_USER: &str = "rest/api/2/group/user";
pub const GROUPS_PICKER: &str = "rest/api/2/groups/picker";
pub const ISSUE: &str = "rest/api/2/issue";
pub const ISSUE_SECURITY_SCHEMES: &str = "rest/api/2/issuesecurityschemes";
pub const ISSUE_TYPE: &str = "rest/api/2/issuetype";
pub const NOTIFICATION_SCHEME: &str = "rest/api/2/notificationscheme";
pub const PERMISSION_SCHEME: &str = "rest/api/2/permissionscheme";
pub const PROJECT: &str = "rest/api/2/project";
pub const PROJECT_CATEGORY: &str = "rest/api/2/projectCategory";
pub const PROJECT_TYPE: &str = "rest/api/2/project/type";
pub const ROLE: &str = "rest/api/2/role";
pub const SEARCH: &str = "rest/api/2/search";
pub const USER: &str = "rest/api/2/user";
pub const USER_SEARCH: &str = "rest/api/2/user/search";
pub const WORKFLOW: &str = "rest/api/2/workflow";
pub const WORKFLOW_SCHEME: &str = "rest/api/2/workflowscheme";

/// `collection/id`.
pub fn item(collection: &str, id: impl std::fmt::Display) -> String {
    format!("{collection}/{id}")
}

/// `project/{key}/role/{id}`.
pub fn project_role(project: &str, role_id: impl std::fmt::Display) -> String {
    format!("{PROJECT}/{project}/role/{role_id}")
}
