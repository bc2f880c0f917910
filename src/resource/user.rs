//! Jira user resource

use declarative::{
    Address, Compare, Create, DesiredState, EnsureState, Error, Field, FieldMapping, Lookup, Resource, ResourceKind,
    Result,
};
use jirakit::{Query, Transport, endpoints};
use serde::{Deserialize, Serialize};

/// A Jira user, addressed by `key` when given, otherwise by `username`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Never sent on create; Jira activates new users itself
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_application_keys")]
    pub application_keys: Vec<String>,
    #[serde(default)]
    pub state: EnsureState,
}

fn default_active() -> bool {
    true
}

fn default_application_keys() -> Vec<String> {
    vec!["jira-core".to_string()]
}

impl User {
    fn query(&self) -> Query {
        let query = match (&self.username, &self.key) {
            (_, Some(key)) => Query::new().with("key", key),
            (Some(username), None) => Query::new().with("username", username),
            (None, None) => Query::new(),
        };
        query.with("expand", "groups,applicationRoles")
    }

    fn mapping() -> Result<FieldMapping> {
        FieldMapping::new(vec![
            Field::new("username", "name"),
            Field::new("key", "key"),
            Field::new("password", "password"),
            Field::new("email_address", "emailAddress").updatable(),
            Field::new("display_name", "displayName").updatable(),
            Field::new("active", "active").updatable().skip_on_create(),
            Field::new("application_keys", "applicationKeys")
                .updatable()
                .compare(Compare::SetOfKeys {
                    source: "applicationRoles",
                    items: "items",
                    key: "key",
                }),
        ])
    }
}

impl Resource for User {
    fn kind(&self) -> &'static str {
        "user"
    }

    fn name(&self) -> String {
        self.username.clone().or_else(|| self.key.clone()).unwrap_or_default()
    }

    fn desired(&self) -> Result<DesiredState> {
        if self.username.is_none() && self.key.is_none() {
            return Err(Error::invalid(self.kind(), "username", "one of username or key is required"));
        }
        super::desired_of(self.kind(), self)
    }

    fn descriptor(&self, _transport: &dyn Transport) -> Result<ResourceKind> {
        Ok(ResourceKind::new(
            self.kind(),
            self.name(),
            Self::mapping()?,
            Lookup::Direct(Address::new(endpoints::USER).with_query(self.query())),
            Create::post(endpoints::USER),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, ReconcileOptions, apply_resource};
    use jirakit::{Method, MockTransport};
    use serde_json::{Value, json};

    fn alice() -> User {
        serde_json::from_value(json!({
            "username": "alice",
            "email_address": "alice@example.com",
            "display_name": "Alice",
        }))
        .unwrap()
    }

    fn remote_alice(roles: &[&str]) -> Value {
        json!({
            "name": "alice",
            "key": "alice",
            "emailAddress": "alice@example.com",
            "displayName": "Alice",
            "active": true,
            "applicationRoles": {
                "size": roles.len(),
                "items": roles.iter().map(|k| json!({"key": k, "name": k})).collect::<Vec<_>>(),
            },
        })
    }

    #[test]
    fn test_defaults() {
        let user = alice();
        assert!(user.active);
        assert_eq!(user.application_keys, vec!["jira-core"]);
        let desired = user.desired().unwrap();
        assert_eq!(desired.param("application_keys"), Some(&json!(["jira-core"])));
    }

    #[test]
    fn test_username_or_key_required() {
        let user: User = serde_json::from_value(json!({"display_name": "Nobody"})).unwrap();
        assert!(user.desired().is_err());
    }

    #[test]
    fn test_lookup_query() {
        assert_eq!(alice().query().to_string(), "username=alice&expand=groups,applicationRoles");

        let by_key: User = serde_json::from_value(json!({"key": "JIRAUSER1"})).unwrap();
        assert_eq!(by_key.query().to_string(), "key=JIRAUSER1&expand=groups,applicationRoles");
        assert_eq!(by_key.name(), "JIRAUSER1");
    }

    #[test]
    fn test_key_wins_over_username() {
        let renamed: User = serde_json::from_value(json!({
            "username": "alice2",
            "key": "JIRAUSER10100",
            "state": "absent",
        }))
        .unwrap();
        assert_eq!(renamed.query().to_string(), "key=JIRAUSER10100&expand=groups,applicationRoles");

        let mut mock = MockTransport::new();
        mock.absent(Method::Get, endpoints::USER);
        let outcome = apply_resource(&renamed, &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);
        assert_eq!(
            mock.calls(),
            vec!["GET rest/api/2/user?key=JIRAUSER10100&expand=groups,applicationRoles"]
        );
    }

    #[test]
    fn test_create_never_sends_active() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, endpoints::USER)
            .found(Method::Get, endpoints::USER, remote_alice(&["jira-core"]))
            .found(Method::Post, endpoints::USER, json!({}));

        let outcome = apply_resource(&alice(), &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::Created);

        let body = mock.mutations()[0].body.clone().unwrap();
        assert!(body.get("active").is_none());
        assert_eq!(body["name"], "alice");
        assert_eq!(body["emailAddress"], "alice@example.com");
        assert_eq!(body["applicationKeys"], json!(["jira-core"]));
    }

    #[test]
    fn test_application_keys_compared_as_set() {
        let mut user = alice();
        user.application_keys = vec!["jira-software".to_string(), "jira-core".to_string()];

        let mut mock = MockTransport::new();
        mock.found(Method::Get, endpoints::USER, remote_alice(&["jira-core", "jira-software"]));

        let outcome = apply_resource(&user, &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);
    }

    #[test]
    fn test_update_sends_changed_fields() {
        let mut user = alice();
        user.display_name = Some("Alice Liddell".to_string());

        let mut mock = MockTransport::new();
        mock.found(Method::Get, endpoints::USER, remote_alice(&["jira-core"]))
            .found(Method::Put, endpoints::USER, json!({}));

        let outcome = apply_resource(&user, &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::Updated);

        let put = &mock.mutations()[0];
        assert_eq!(put.to_string(), "PUT rest/api/2/user?username=alice&expand=groups,applicationRoles");
        assert_eq!(put.body, Some(json!({"displayName": "Alice Liddell"})));
    }
}
