//! Diff computation between desired state and a snapshot

use crate::error::Result;
use crate::mapping::Compare;
use crate::resource::{Address, DesiredState, ResourceKind};
use crate::types::Change;
use jirakit::{Fetched, Query, Transport};
use serde_json::{Map, Value};

/// Compare every updatable field of `kind` against `snapshot`.
///
/// Fields compared through a sub-resource ([`Compare::Resolved`]) cost one
/// GET each, and only when the param is supplied.
pub fn compute_changes<T: Transport + ?Sized>(
    transport: &T,
    kind: &ResourceKind,
    desired: &DesiredState,
    address: Option<&Address>,
    snapshot: &Value,
) -> Result<Vec<Change>> {
    let scope = kind.scoped(snapshot);
    let mut changes = Vec::new();

    for field in kind.fields.updatable_fields() {
        let want = desired.param(field.param);

        let remote = match (&field.compare, address) {
            (Compare::Resolved { suffix }, Some(address)) if want.is_some() => {
                resolve_sub_resource(transport, address, suffix)?
            }
            _ => field.remote_value(scope),
        };

        if let Some(send) = field.differs(want, remote.as_ref()) {
            log::debug!(
                "{} {}: {} differs ({} -> {})",
                kind.kind,
                kind.name,
                field.remote,
                remote.as_ref().unwrap_or(&Value::Null),
                send
            );
            changes.push(Change {
                param: field.param.to_string(),
                field: field.remote.to_string(),
                from: remote.unwrap_or(Value::Null),
                to: want.cloned().unwrap_or(Value::Null),
                send: field.encode.apply(&send),
            });
        }
    }

    Ok(changes)
}

/// `id` of `<address>/<suffix>`, `null` when the sub-resource is absent.
fn resolve_sub_resource<T: Transport + ?Sized>(
    transport: &T,
    address: &Address,
    suffix: &str,
) -> Result<Option<Value>> {
    let path = format!("{}/{suffix}", address.path);
    Ok(Some(match transport.get(&path, &Query::new())? {
        Fetched::Found(sub) => sub.get("id").cloned().unwrap_or(Value::Null),
        Fetched::Absent => Value::Null,
    }))
}

/// Build the update payload for a set of changes.
///
/// Holds the changed fields (or every supplied updatable field for kinds
/// with full updates) plus any companion fields, wrapped in the envelope.
pub fn update_payload(kind: &ResourceKind, desired: &DesiredState, changes: &[Change]) -> Value {
    let mut payload = Map::new();

    if kind.update.full {
        for field in kind.fields.updatable_fields() {
            if let Some(value) = desired.param(field.param) {
                payload.insert(field.remote.to_string(), field.encode.apply(value));
            }
        }
    } else {
        for change in changes {
            payload.insert(change.field.clone(), change.send.clone());
        }
    }

    for companion in &kind.update.companions {
        if changes.iter().any(|c| c.field == companion.trigger) {
            payload.insert(companion.field.to_string(), companion.value.clone());
        }
    }

    kind.wrap(payload)
}
