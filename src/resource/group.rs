//! Jira group resource

use declarative::{
    Address, Create, DesiredState, EnsureState, Field, FieldMapping, Lookup, Removal, Resource, ResourceKind, Result,
};
use jirakit::{Query, Transport, endpoints};
use serde::{Deserialize, Serialize};

/// A Jira group. Groups have no updatable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Group {
    pub group_name: String,
    #[serde(default)]
    pub state: EnsureState,
}

impl Group {
    fn query(&self) -> Query {
        Query::new().with("groupname", &self.group_name)
    }
}

impl Resource for Group {
    fn kind(&self) -> &'static str {
        "group"
    }

    fn name(&self) -> String {
        self.group_name.clone()
    }

    fn desired(&self) -> Result<DesiredState> {
        super::desired_of(self.kind(), self)
    }

    fn descriptor(&self, _transport: &dyn Transport) -> Result<ResourceKind> {
        let fields = FieldMapping::new(vec![Field::new("group_name", "name")])?;

        Ok(ResourceKind::new(
            self.kind(),
            &self.group_name,
            fields,
            Lookup::Direct(Address::new(endpoints::GROUP_MEMBER).with_query(self.query())),
            Create::post(endpoints::GROUP),
        )
        .removal(Removal::Delete(Some(
            Address::new(endpoints::GROUP).with_query(self.query()),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, ReconcileOptions, apply_resource};
    use jirakit::{Method, MockTransport};
    use serde_json::json;

    fn group(name: &str, state: EnsureState) -> Group {
        Group {
            group_name: name.to_string(),
            state,
        }
    }

    #[test]
    fn test_create_group() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, endpoints::GROUP_MEMBER)
            .found(Method::Get, endpoints::GROUP_MEMBER, json!({"values": [], "total": 0}))
            .found(Method::Post, endpoints::GROUP, json!({"name": "g1"}));

        let outcome =
            apply_resource(&group("g1", EnsureState::Present), &mock, ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Created);
        assert!(outcome.changed);
        assert_eq!(
            mock.calls(),
            vec![
                "GET rest/api/2/group/member?groupname=g1",
                "POST rest/api/2/group",
                "GET rest/api/2/group/member?groupname=g1",
            ]
        );
        assert_eq!(mock.mutations()[0].body, Some(json!({"name": "g1"})));
    }

    #[test]
    fn test_existing_group_is_unchanged() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, endpoints::GROUP_MEMBER, json!({"values": []}));

        let outcome =
            apply_resource(&group("g1", EnsureState::Present), &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_delete_group() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, endpoints::GROUP_MEMBER, json!({"values": []}))
            .found(Method::Delete, endpoints::GROUP, json!({}));

        let outcome =
            apply_resource(&group("g1", EnsureState::Absent), &mock, ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::Deleted);
        assert_eq!(mock.calls()[1], "DELETE rest/api/2/group?groupname=g1");
    }
}
