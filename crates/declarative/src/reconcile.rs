//! The reconciliation algorithm
//!
//! One idempotent pass per resource: fetch, classify, (unless dry-run)
//! apply at most one mutation, confirm, report.
//!
//! Create and update are followed by a separate confirmatory fetch with no
//! transactional guarantee. If that fetch fails, the mutation has already
//! taken effect while the caller sees an error. Running the same desired
//! state again converges without a second mutation.

use crate::diff::{compute_changes, update_payload};
use crate::error::Result;
use crate::resource::{Address, Confirm, DesiredState, Lookup, Projection, Removal, ResourceKind};
use crate::types::{Action, Change, Outcome, ReconcileOptions};
use jirakit::{Error as JiraError, Fetched, Request, Transport, endpoints, resolve_id};
use serde_json::{Value, json};

/// Converge one remote resource to `desired`.
pub fn reconcile<T: Transport + ?Sized>(
    transport: &T,
    kind: &ResourceKind,
    desired: &DesiredState,
    options: &ReconcileOptions,
) -> Result<Outcome> {
    let (address, snapshot) = fetch(transport, kind)?;
    let (action, changes) = classify(transport, kind, desired, address.as_ref(), &snapshot)?;

    log::debug!("{} {}: {action} ({} field changes)", kind.kind, kind.name, changes.len());

    if options.dry_run || action == Action::None {
        let outcome = Outcome::new(kind.kind, &kind.name, snapshot.into_option(), action).with_changes(changes);
        return Ok(if options.dry_run { outcome.simulated() } else { outcome });
    }

    let final_snapshot = match action {
        Action::Created => create(transport, kind, desired)?,
        Action::Updated => {
            let address = require_address(kind, address.as_ref())?;
            update(transport, kind, desired, address, &changes)?
        }
        Action::Deleted => {
            let address = require_address(kind, address.as_ref())?;
            remove(transport, kind, address)?;
            snapshot
        }
        Action::None => snapshot,
    };

    log::info!("{} {}: {action}", kind.kind, kind.name);

    Ok(Outcome::new(kind.kind, &kind.name, final_snapshot.into_option(), action).with_changes(changes))
}

/// Locate the resource and project its snapshot.
pub fn fetch<T: Transport + ?Sized>(transport: &T, kind: &ResourceKind) -> Result<(Option<Address>, Fetched<Value>)> {
    let (address, fetched) = match &kind.lookup {
        Lookup::Direct(address) => {
            let fetched = transport.get(&address.path, &address.query)?;
            (Some(address.clone()), fetched)
        }
        Lookup::ByName { collection, name } => match resolve_id(transport, collection, name)? {
            Some(id) => {
                let address = Address::new(endpoints::item(collection, id));
                let fetched = transport.get(&address.path, &address.query)?;
                (Some(address), fetched)
            }
            None => (None, Fetched::Absent),
        },
        Lookup::Unaddressed => (None, Fetched::Absent),
    };

    let snapshot = match fetched {
        Fetched::Found(value) => project(&kind.projection, value),
        Fetched::Absent => Fetched::Absent,
    };

    Ok((address, snapshot))
}

fn project(projection: &Projection, value: Value) -> Fetched<Value> {
    match projection {
        Projection::Raw => Fetched::Found(value),
        Projection::RoleActors => {
            let mut users = Vec::new();
            let mut groups = Vec::new();
            for actor in value.get("actors").and_then(Value::as_array).into_iter().flatten() {
                let name = actor.get("name").cloned().unwrap_or(Value::Null);
                match actor.get("type").and_then(Value::as_str) {
                    Some("atlassian-user-role-actor") => users.push(name),
                    Some("atlassian-group-role-actor") => groups.push(name),
                    _ => {}
                }
            }
            if users.is_empty() && groups.is_empty() {
                Fetched::Absent
            } else {
                Fetched::Found(json!({ "users": users, "groups": groups }))
            }
        }
        Projection::Member { list, field, value: expected } => value
            .get(*list)
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .find(|item| item.get(*field).and_then(Value::as_str) == Some(expected.as_str()))
            })
            .cloned()
            .into(),
    }
}

fn classify<T: Transport + ?Sized>(
    transport: &T,
    kind: &ResourceKind,
    desired: &DesiredState,
    address: Option<&Address>,
    snapshot: &Fetched<Value>,
) -> Result<(Action, Vec<Change>)> {
    Ok(match (desired.state.is_present(), snapshot) {
        (false, Fetched::Absent) => (Action::None, Vec::new()),
        (false, Fetched::Found(_)) => (Action::Deleted, Vec::new()),
        (true, Fetched::Absent) => {
            // An attached resource with nothing to attach is already converged.
            if kind.removal.is_clear() && creation_payload(kind, desired).is_empty() {
                (Action::None, Vec::new())
            } else {
                (Action::Created, Vec::new())
            }
        }
        (true, Fetched::Found(current)) => {
            let changes = compute_changes(transport, kind, desired, address, current)?;
            if changes.is_empty() {
                (Action::None, changes)
            } else {
                (Action::Updated, changes)
            }
        }
    })
}

fn creation_payload(kind: &ResourceKind, desired: &DesiredState) -> serde_json::Map<String, Value> {
    kind.fields.creation_payload(|param| desired.param(param))
}

fn require_address<'a>(kind: &ResourceKind, address: Option<&'a Address>) -> Result<&'a Address> {
    address.ok_or_else(|| {
        JiraError::InvalidResponse(format!("{} {} has no resolved address", kind.kind, kind.name)).into()
    })
}

fn create<T: Transport + ?Sized>(transport: &T, kind: &ResourceKind, desired: &DesiredState) -> Result<Fetched<Value>> {
    let mut payload = creation_payload(kind, desired);
    for (field, value) in &kind.create.extras {
        payload.insert(field.clone(), value.clone());
    }

    let request = Request::new(kind.create.method, &kind.create.address.path)
        .with_query(kind.create.address.query.clone())
        .with_body(kind.wrap(payload));
    let response = transport.request(&request)?;

    match &kind.confirm {
        Confirm::Refetch => Ok(fetch(transport, kind)?.1),
        Confirm::Response => Ok(response),
        Confirm::FollowKey { collection } => {
            let key = response
                .found()
                .and_then(|body| body.get("key"))
                .and_then(Value::as_str)
                .ok_or_else(|| JiraError::InvalidResponse(format!("{} create response has no key", kind.kind)))?;
            Ok(transport.get(&endpoints::item(collection, key), &jirakit::Query::new())?)
        }
    }
}

fn update<T: Transport + ?Sized>(
    transport: &T,
    kind: &ResourceKind,
    desired: &DesiredState,
    address: &Address,
    changes: &[Change],
) -> Result<Fetched<Value>> {
    let request = Request::new(kind.update.method, &address.path)
        .with_query(address.query.clone())
        .with_body(update_payload(kind, desired, changes));
    transport.request(&request)?;

    Ok(fetch(transport, kind)?.1)
}

fn remove<T: Transport + ?Sized>(transport: &T, kind: &ResourceKind, address: &Address) -> Result<()> {
    match &kind.removal {
        Removal::Delete(target) => {
            let target = target.as_ref().unwrap_or(address);
            transport.delete(&target.path, &target.query)?;
        }
        Removal::Clear(payload) => {
            transport.put(&address.path, &address.query, payload.clone())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Compare, Field, FieldMapping};
    use crate::resource::Create;
    use crate::types::EnsureState;
    use jirakit::{Method, MockTransport, Query};

    const MEMBER: &str = "rest/api/2/group/member";

    fn group_kind() -> ResourceKind {
        let fields = FieldMapping::new(vec![Field::new("group_name", "name")]).unwrap();
        ResourceKind::new(
            "group",
            "g1",
            fields,
            Lookup::Direct(Address::new(MEMBER).with_query(Query::new().with("groupname", "g1"))),
            Create::post("rest/api/2/group"),
        )
        .removal(Removal::Delete(Some(
            Address::new("rest/api/2/group").with_query(Query::new().with("groupname", "g1")),
        )))
    }

    fn group(state: EnsureState) -> DesiredState {
        DesiredState::new(state).with("group_name", "g1")
    }

    fn project_kind() -> ResourceKind {
        let fields = FieldMapping::new(vec![
            Field::new("key", "key"),
            Field::new("name", "name"),
            Field::new("lead", "lead").updatable().compare(Compare::NamedObject),
            Field::new("description", "description")
                .updatable()
                .compare(Compare::NullableText),
        ])
        .unwrap();
        ResourceKind::new(
            "project",
            "PRJ1",
            fields,
            Lookup::Direct(Address::new("rest/api/2/project/PRJ1")),
            Create::post("rest/api/2/project").extra("assigneeType", "PROJECT_LEAD"),
        )
        .companion("lead", "assigneeType", "PROJECT_LEAD")
    }

    fn role_kind(name: &str) -> ResourceKind {
        let fields = FieldMapping::new(vec![
            Field::new("name", "name"),
            Field::new("description", "description").updatable(),
        ])
        .unwrap();
        ResourceKind::new(
            "role",
            name,
            fields,
            Lookup::ByName {
                collection: "rest/api/2/role".into(),
                name: name.into(),
            },
            Create::post("rest/api/2/role"),
        )
        .confirm(Confirm::Response)
        .update_method(Method::Post)
    }

    #[test]
    fn test_group_create() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, MEMBER)
            .found(Method::Get, MEMBER, json!({"values": [], "total": 0}))
            .found(Method::Post, "rest/api/2/group", json!({"name": "g1"}));

        let outcome = reconcile(&mock, &group_kind(), &group(EnsureState::Present), &ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Created);
        assert!(outcome.changed);
        assert!(outcome.snapshot.is_some());
        assert_eq!(
            mock.calls(),
            vec![
                "GET rest/api/2/group/member?groupname=g1",
                "POST rest/api/2/group",
                "GET rest/api/2/group/member?groupname=g1",
            ]
        );
        assert_eq!(mock.requests()[1].body, Some(json!({"name": "g1"})));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, MEMBER, json!({"values": []}));

        let outcome = reconcile(&mock, &group_kind(), &group(EnsureState::Present), &ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);
        assert!(!outcome.changed);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_symmetric_absence() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, MEMBER);

        let outcome = reconcile(&mock, &group_kind(), &group(EnsureState::Absent), &ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);
        assert!(!outcome.changed);
        assert_eq!(outcome.snapshot, None);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_delete_uses_explicit_target_without_refetch() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, MEMBER, json!({"values": []}))
            .found(Method::Delete, "rest/api/2/group", json!({}));

        let outcome = reconcile(&mock, &group_kind(), &group(EnsureState::Absent), &ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::Deleted);
        assert_eq!(outcome.snapshot, Some(json!({"values": []})));
        assert_eq!(
            mock.calls(),
            vec![
                "GET rest/api/2/group/member?groupname=g1",
                "DELETE rest/api/2/group?groupname=g1",
            ]
        );
    }

    #[test]
    fn test_dry_run_never_mutates() {
        let dry = ReconcileOptions { dry_run: true };

        let mut mock = MockTransport::new();
        mock.absent(Method::Get, MEMBER);
        let created = reconcile(&mock, &group_kind(), &group(EnsureState::Present), &dry).unwrap();
        assert_eq!(created.action, Action::Created);
        assert!(created.changed);
        assert!(created.dry_run);

        let mut mock = MockTransport::new();
        mock.found(Method::Get, MEMBER, json!({"values": []}));
        let deleted = reconcile(&mock, &group_kind(), &group(EnsureState::Absent), &dry).unwrap();
        assert_eq!(deleted.action, Action::Deleted);

        let mut mock = MockTransport::new();
        mock.found(
            Method::Get,
            "rest/api/2/project/PRJ1",
            json!({"key": "PRJ1", "lead": {"name": "alice"}}),
        );
        let desired = DesiredState::default().with("key", "PRJ1").with("lead", "bob");
        let updated = reconcile(&mock, &project_kind(), &desired, &dry).unwrap();
        assert_eq!(updated.action, Action::Updated);
        assert!(mock.mutations().is_empty());
    }

    #[test]
    fn test_project_lead_change() {
        let mut mock = MockTransport::new();
        mock.found(
            Method::Get,
            "rest/api/2/project/PRJ1",
            json!({"key": "PRJ1", "name": "One", "lead": {"name": "alice"}, "description": ""}),
        )
        .found(Method::Put, "rest/api/2/project/PRJ1", json!({}));

        let desired = DesiredState::default()
            .with("key", "PRJ1")
            .with("name", "One")
            .with("lead", "bob");
        let outcome = reconcile(&mock, &project_kind(), &desired, &ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Updated);
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].field, "lead");

        let mutations = mock.mutations();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].method, Method::Put);
        assert_eq!(
            mutations[0].body,
            Some(json!({"lead": "bob", "assigneeType": "PROJECT_LEAD"}))
        );
    }

    #[test]
    fn test_null_vs_empty_description() {
        let mut mock = MockTransport::new();
        mock.found(
            Method::Get,
            "rest/api/2/project/PRJ1",
            json!({"key": "PRJ1", "lead": {"name": "alice"}, "description": ""}),
        );
        let desired = DesiredState::default().with("key", "PRJ1").with("lead", "alice");
        let outcome = reconcile(&mock, &project_kind(), &desired, &ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::None);

        let mut mock = MockTransport::new();
        mock.found(
            Method::Get,
            "rest/api/2/project/PRJ1",
            json!({"key": "PRJ1", "lead": {"name": "alice"}, "description": null}),
        )
        .found(Method::Put, "rest/api/2/project/PRJ1", json!({}));
        let desired = desired.with("description", "x");
        let outcome = reconcile(&mock, &project_kind(), &desired, &ReconcileOptions::default()).unwrap();
        assert_eq!(outcome.action, Action::Updated);
        assert_eq!(mock.mutations()[0].body, Some(json!({"description": "x"})));
    }

    #[test]
    fn test_create_adds_extras_and_omits_blanks() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, "rest/api/2/project/PRJ1")
            .found(Method::Get, "rest/api/2/project/PRJ1", json!({"key": "PRJ1"}))
            .found(Method::Post, "rest/api/2/project", json!({"id": 10000, "key": "PRJ1"}));

        let desired = DesiredState::default()
            .with("key", "PRJ1")
            .with("name", "One")
            .with("lead", "alice")
            .with("description", "");
        let outcome = reconcile(&mock, &project_kind(), &desired, &ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Created);
        assert_eq!(
            mock.mutations()[0].body,
            Some(json!({"key": "PRJ1", "name": "One", "lead": "alice", "assigneeType": "PROJECT_LEAD"}))
        );
    }

    #[test]
    fn test_by_name_lookup_and_post_update() {
        let mut mock = MockTransport::new();
        mock.found(
            Method::Get,
            "rest/api/2/role",
            json!([{"name": "Developers", "id": 10001}]),
        )
        .found(
            Method::Get,
            "rest/api/2/role/10001",
            json!({"name": "Developers", "id": 10001, "description": "old"}),
        )
        .found(Method::Post, "rest/api/2/role/10001", json!({}));

        let desired = DesiredState::default()
            .with("name", "Developers")
            .with("description", "new");
        let outcome = reconcile(&mock, &role_kind("Developers"), &desired, &ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Updated);
        let mutations = mock.mutations();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].to_string(), "POST rest/api/2/role/10001");
        assert_eq!(mutations[0].body, Some(json!({"description": "new"})));
    }

    #[test]
    fn test_by_name_miss_creates_and_confirms_from_response() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, "rest/api/2/role", json!([]))
            .found(
                Method::Post,
                "rest/api/2/role",
                json!({"name": "Testers", "id": 10100}),
            );

        let desired = DesiredState::default().with("name", "Testers");
        let outcome = reconcile(&mock, &role_kind("Testers"), &desired, &ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.action, Action::Created);
        assert_eq!(outcome.snapshot, Some(json!({"name": "Testers", "id": 10100})));
        assert_eq!(mock.calls(), vec!["GET rest/api/2/role", "POST rest/api/2/role"]);
    }

    #[test]
    fn test_follow_key_confirm() {
        let fields = FieldMapping::new(vec![Field::new("summary", "summary")]).unwrap();
        let kind = ResourceKind::new("issue", "new issue", fields, Lookup::Unaddressed, Create::post("rest/api/2/issue"))
            .envelope("fields")
            .scope("fields")
            .confirm(Confirm::FollowKey {
                collection: "rest/api/2/issue".into(),
            });

        let mut mock = MockTransport::new();
        mock.found(Method::Post, "rest/api/2/issue", json!({"id": "10000", "key": "PRJ1-1"}))
            .found(Method::Get, "rest/api/2/issue/PRJ1-1", json!({"key": "PRJ1-1"}));

        let desired = DesiredState::default().with("summary", "s");
        let outcome = reconcile(&mock, &kind, &desired, &ReconcileOptions::default()).unwrap();

        assert_eq!(outcome.snapshot, Some(json!({"key": "PRJ1-1"})));
        assert_eq!(mock.requests()[0].body, Some(json!({"fields": {"summary": "s"}})));
        assert_eq!(mock.calls(), vec!["POST rest/api/2/issue", "GET rest/api/2/issue/PRJ1-1"]);
    }

    #[test]
    fn test_http_error_surfaces_verbatim() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, MEMBER).fail(
            Method::Post,
            "rest/api/2/group",
            400,
            json!({"errorMessages": ["group name is invalid"]}),
        );

        let err = reconcile(&mock, &group_kind(), &group(EnsureState::Present), &ReconcileOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "HTTP Error 400: [group name is invalid]");
        // No confirmatory fetch after a failed create
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_role_actor_projection() {
        let value = json!({"actors": [
            {"type": "atlassian-user-role-actor", "name": "alice"},
            {"type": "atlassian-group-role-actor", "name": "devs"}
        ]});
        assert_eq!(
            project(&Projection::RoleActors, value),
            Fetched::Found(json!({"users": ["alice"], "groups": ["devs"]}))
        );
        assert_eq!(
            project(&Projection::RoleActors, json!({"actors": []})),
            Fetched::Absent
        );
    }

    #[test]
    fn test_member_projection() {
        let projection = Projection::Member {
            list: "values",
            field: "name",
            value: "bob".into(),
        };
        let group = json!({"values": [{"name": "alice"}, {"name": "bob", "active": true}]});
        assert_eq!(
            project(&projection, group),
            Fetched::Found(json!({"name": "bob", "active": true}))
        );
        assert_eq!(project(&projection, json!({"values": []})), Fetched::Absent);
    }
}
