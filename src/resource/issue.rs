//! Jira issue resource

use declarative::{
    Address, Compare, Confirm, Create, DesiredState, Encode, EnsureState, Field, FieldMapping, Lookup, Resource,
    ResourceKind, Result,
};
use jirakit::{Transport, endpoints};
use serde::{Deserialize, Serialize};

/// A Jira issue
///
/// Without a `key` the issue cannot be located, so a present issue is
/// created on every run and an absent one is never touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Issue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default)]
    pub state: EnsureState,
}

impl Issue {
    fn mapping() -> Result<FieldMapping> {
        let person = |param: &'static str, remote: &'static str| {
            Field::new(param, remote)
                .updatable()
                .compare(Compare::NamedObject)
                .encode(Encode::NamedObject)
        };

        FieldMapping::new(vec![
            person("assignee", "assignee"),
            Field::new("description", "description")
                .updatable()
                .compare(Compare::NullableText),
            person("issue_type", "issuetype"),
            Field::new("project_key", "project").encode(Encode::KeyedObject),
            person("reporter", "reporter"),
            Field::new("summary", "summary").updatable(),
        ])
    }
}

impl Resource for Issue {
    fn kind(&self) -> &'static str {
        "issue"
    }

    fn name(&self) -> String {
        self.key
            .clone()
            .or_else(|| self.summary.clone())
            .unwrap_or_default()
    }

    fn desired(&self) -> Result<DesiredState> {
        let desired = super::desired_of(self.kind(), self)?;
        if self.key.is_none() {
            super::require(self.kind(), "project_key", self.project_key.as_ref(), &desired)?;
            super::require(self.kind(), "summary", self.summary.as_ref(), &desired)?;
        }
        Ok(desired)
    }

    fn descriptor(&self, _transport: &dyn Transport) -> Result<ResourceKind> {
        let lookup = match &self.key {
            Some(key) => Lookup::Direct(Address::new(endpoints::item(endpoints::ISSUE, key))),
            None => Lookup::Unaddressed,
        };

        Ok(ResourceKind::new(
            self.kind(),
            self.name(),
            Self::mapping()?,
            lookup,
            Create::post(endpoints::ISSUE),
        )
        .confirm(Confirm::FollowKey {
            collection: endpoints::ISSUE.to_string(),
        })
        .envelope("fields")
        .scope("fields"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, ReconcileOptions, apply_resource};
    use jirakit::{Method, MockTransport};
    use serde_json::{Value, json};

    fn issue(params: Value) -> Issue {
        serde_json::from_value(params).unwrap()
    }

    fn remote() -> Value {
        json!({
            "key": "PRJ1-1",
            "fields": {
                "summary": "Broken build",
                "description": null,
                "issuetype": {"name": "Bug"},
                "assignee": {"name": "alice"},
                "reporter": {"name": "bob"},
                "project": {"key": "PRJ1"},
            }
        })
    }

    #[test]
    fn test_create_wraps_fields_and_follows_key() {
        let mut mock = MockTransport::new();
        mock.found(Method::Post, endpoints::ISSUE, json!({"id": "10000", "key": "PRJ1-1"}))
            .found(Method::Get, "rest/api/2/issue/PRJ1-1", remote());

        let new = issue(json!({
            "project_key": "PRJ1",
            "summary": "Broken build",
            "issue_type": "Bug",
            "assignee": "alice",
        }));
        let outcome = apply_resource(&new, &mock, ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Created);
        assert_eq!(outcome.snapshot, Some(remote()));
        assert_eq!(
            mock.mutations()[0].body,
            Some(json!({"fields": {
                "project": {"key": "PRJ1"},
                "summary": "Broken build",
                "issuetype": {"name": "Bug"},
                "assignee": {"name": "alice"},
            }}))
        );
        assert_eq!(
            mock.calls(),
            vec!["POST rest/api/2/issue", "GET rest/api/2/issue/PRJ1-1"]
        );
    }

    #[test]
    fn test_update_reads_nested_fields() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, "rest/api/2/issue/PRJ1-1", remote())
            .found(Method::Put, "rest/api/2/issue/PRJ1-1", json!({}));

        let existing = issue(json!({
            "key": "PRJ1-1",
            "summary": "Broken build",
            "issue_type": "Bug",
            "assignee": "carol",
            "reporter": "bob",
        }));
        let outcome = apply_resource(&existing, &mock, ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Updated);
        assert_eq!(
            mock.mutations()[0].body,
            Some(json!({"fields": {"assignee": {"name": "carol"}}}))
        );
    }

    #[test]
    fn test_keyless_issue_requires_project_and_summary() {
        assert!(issue(json!({"summary": "x"})).desired().is_err());
        assert!(issue(json!({"key": "PRJ1-1", "summary": "x"})).desired().is_ok());
    }

    #[test]
    fn test_absent_without_key_does_nothing() {
        let mock = MockTransport::new();
        let gone = issue(json!({"summary": "x", "state": "absent"}));
        let outcome = apply_resource(&gone, &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);
        assert!(mock.requests().is_empty());
    }
}
