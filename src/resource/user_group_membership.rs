//! Membership of a user in a group

use declarative::{
    Address, Create, DesiredState, EnsureState, Field, FieldMapping, Lookup, Projection, Removal, Resource,
    ResourceKind, Result,
};
use jirakit::{Error as JiraError, Method, Query, Transport, endpoints};
use serde::{Deserialize, Serialize};

/// A user's membership in a group. Both must already exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserGroupMembership {
    pub group_name: String,
    pub username: String,
    #[serde(default)]
    pub state: EnsureState,
}

impl UserGroupMembership {
    fn group_query(&self) -> Query {
        Query::new().with("groupname", &self.group_name)
    }

    /// Fail with `NotFound` unless the group and the user exist.
    fn check_exists(&self, transport: &dyn Transport) -> Result<()> {
        if transport.get(endpoints::GROUP_MEMBER, &self.group_query())?.is_absent() {
            return Err(JiraError::not_found("group", &self.group_name).into());
        }
        let user = Query::new().with("username", &self.username);
        if transport.get(endpoints::USER, &user)?.is_absent() {
            return Err(JiraError::not_found("user", &self.username).into());
        }
        Ok(())
    }
}

impl Resource for UserGroupMembership {
    fn kind(&self) -> &'static str {
        "user_group_membership"
    }

    fn name(&self) -> String {
        format!("{}.{}", self.group_name, self.username)
    }

    fn desired(&self) -> Result<DesiredState> {
        super::desired_of(self.kind(), self)
    }

    fn descriptor(&self, transport: &dyn Transport) -> Result<ResourceKind> {
        self.check_exists(transport)?;

        let fields = FieldMapping::new(vec![Field::new("username", "name")])?;
        let member = Address::new(endpoints::GROUP_MEMBER)
            .with_query(self.group_query().with("includeInactiveUsers", true));

        Ok(ResourceKind::new(
            self.kind(),
            self.name(),
            fields,
            Lookup::Direct(member),
            Create::with_method(
                Method::Post,
                Address::new(endpoints::GROUP_USER).with_query(self.group_query()),
            ),
        )
        .projection(Projection::Member {
            list: "values",
            field: "name",
            value: self.username.clone(),
        })
        .removal(Removal::Delete(Some(Address::new(endpoints::GROUP_USER).with_query(
            self.group_query().with("username", &self.username),
        )))))
    }
}
