//! Field mapping tables
//!
//! A [`FieldMapping`] lists, for one resource kind, how each local
//! parameter corresponds to a remote JSON field, whether it can change
//! after creation, how it is compared against a snapshot and how it is
//! written into a payload.

use crate::error::{Error, Result};
use serde_json::{Map, Value, json};
use std::collections::{BTreeSet, HashSet};

/// How a desired value is compared with the remote one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compare {
    /// JSON equality; numbers and numeric strings compare by value.
    /// Skipped when the param is not supplied or the remote key is missing.
    Exact,
    /// Remote is `{ "name": x }`, compared against the param.
    NamedObject,
    /// Remote is an object, compared through one of its keys.
    Nested {
        /// Key inside the remote object, e.g. `id`
        key: &'static str,
    },
    /// `null` and `""` are equal; clearing sends `""`.
    NullableText,
    /// Both sides are lists compared as unordered sets.
    Set,
    /// Remote list is `snapshot[source][items][*][key]`, compared as a set.
    SetOfKeys {
        /// Top-level object holding the list
        source: &'static str,
        /// List inside `source`
        items: &'static str,
        /// Key read from each element
        key: &'static str,
    },
    /// Remote is the `id` of the sub-resource `<address>/<suffix>`.
    Resolved {
        /// Path suffix appended to the resource address
        suffix: &'static str,
    },
}

/// How a desired value is written into a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encode {
    /// The value as-is
    Plain,
    /// `{ "name": v }`
    NamedObject,
    /// `{ "key": v }`
    KeyedObject,
    /// A list rendered as `"a,b"`
    CommaJoined,
}

impl Encode {
    /// Encode a desired value.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Self::Plain => value.clone(),
            Self::NamedObject => json!({ "name": value }),
            Self::KeyedObject => json!({ "key": value }),
            Self::CommaJoined => match value {
                Value::Array(items) => {
                    Value::String(items.iter().map(scalar_string).collect::<Vec<_>>().join(","))
                }
                other => other.clone(),
            },
        }
    }
}

/// One row of a field mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Local parameter name
    pub param: &'static str,
    /// Remote field name written to payloads
    pub remote: &'static str,
    /// Snapshot key read for comparison, when it differs from `remote`
    pub source: Option<&'static str>,
    /// Compared and re-sent on change
    pub updatable: bool,
    /// Sent in the creation payload
    pub create: bool,
    /// Comparison rule
    pub compare: Compare,
    /// Payload encoding
    pub encode: Encode,
}

impl Field {
    /// A create-only field compared exactly and written as-is.
    pub fn new(param: &'static str, remote: &'static str) -> Self {
        Self {
            param,
            remote,
            source: None,
            updatable: false,
            create: true,
            compare: Compare::Exact,
            encode: Encode::Plain,
        }
    }

    /// Mark the field updatable.
    #[must_use]
    pub fn updatable(mut self) -> Self {
        self.updatable = true;
        self
    }

    /// Never send the field on create.
    #[must_use]
    pub fn skip_on_create(mut self) -> Self {
        self.create = false;
        self
    }

    /// Read the remote value from another snapshot key.
    #[must_use]
    pub fn read_from(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the comparison rule.
    #[must_use]
    pub fn compare(mut self, compare: Compare) -> Self {
        self.compare = compare;
        self
    }

    /// Set the payload encoding.
    #[must_use]
    pub fn encode(mut self, encode: Encode) -> Self {
        self.encode = encode;
        self
    }

    /// Snapshot key this field is read from.
    pub fn source(&self) -> &'static str {
        self.source.unwrap_or(self.remote)
    }

    /// Extract the comparable remote value from a snapshot.
    ///
    /// `None` means "nothing to compare against" and skips the field.
    /// [`Compare::Resolved`] fields live in a sub-resource and always
    /// return `None` here.
    pub fn remote_value(&self, scope: &Value) -> Option<Value> {
        let raw = scope.get(self.source());
        match &self.compare {
            Compare::Exact => raw.cloned(),
            Compare::NullableText | Compare::Set => Some(raw.cloned().unwrap_or(Value::Null)),
            Compare::NamedObject => Some(nested(raw, "name")),
            Compare::Nested { key } => Some(nested(raw, key)),
            Compare::SetOfKeys { source, items, key } => {
                let keys = scope
                    .get(*source)
                    .and_then(|s| s.get(*items))
                    .and_then(Value::as_array)
                    .map(|list| list.iter().filter_map(|item| item.get(*key).cloned()).collect())
                    .unwrap_or_default();
                Some(Value::Array(keys))
            }
            Compare::Resolved { .. } => None,
        }
    }

    /// Compare a desired value with the remote one.
    ///
    /// Returns the (unencoded) value to send when they differ. A desired
    /// `None` means the param was not supplied.
    pub fn differs(&self, desired: Option<&Value>, remote: Option<&Value>) -> Option<Value> {
        match &self.compare {
            Compare::NullableText => {
                let want = text(desired);
                let have = text(remote);
                (want != have).then(|| Value::String(want.unwrap_or_default().to_string()))
            }
            Compare::Set | Compare::SetOfKeys { .. } => {
                let want = desired?;
                let have = match remote {
                    None | Some(Value::Null) => Value::Array(Vec::new()),
                    Some(list) => list.clone(),
                };
                (!set_eq(want, &have)).then(|| want.clone())
            }
            Compare::Exact | Compare::NamedObject | Compare::Nested { .. } | Compare::Resolved { .. } => {
                let want = desired?;
                let have = remote?;
                (!loose_eq(want, have)).then(|| want.clone())
            }
        }
    }
}

fn nested(raw: Option<&Value>, key: &str) -> Value {
    raw.and_then(|obj| obj.get(key)).cloned().unwrap_or(Value::Null)
}

/// A nullable text value with `""` folded into `None`.
fn text(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Render a scalar for comparison or joining.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality that treats `10000` and `"10000"` as the same value.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            scalar_string(a) == scalar_string(b)
        }
        _ => a == b,
    }
}

/// Compare two lists as unordered sets.
pub fn set_eq(a: &Value, b: &Value) -> bool {
    fn members(v: &Value) -> Option<BTreeSet<String>> {
        v.as_array().map(|items| items.iter().map(scalar_string).collect())
    }
    match (members(a), members(b)) {
        (Some(x), Some(y)) => x == y,
        _ => loose_eq(a, b),
    }
}

/// Whether a desired value counts as empty and is left out of a create.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Ordered, immutable table of fields for one resource kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    fields: Vec<Field>,
}

impl FieldMapping {
    /// Build a mapping, rejecting duplicate remote field names.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.remote) {
                return Err(Error::DuplicateField {
                    remote: field.remote.to_string(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Every mapped field, in declaration order.
    pub fn all_fields(&self) -> &[Field] {
        &self.fields
    }

    /// The subset flagged updatable.
    pub fn updatable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.updatable)
    }

    /// Look up a field by local parameter name.
    pub fn get(&self, param: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.param == param)
    }

    /// Build a payload from every create field with a non-blank value.
    pub fn creation_payload<'a>(&self, value_of: impl Fn(&str) -> Option<&'a Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|f| f.create)
            .filter_map(|f| {
                let value = value_of(f.param).filter(|v| !is_blank(v))?;
                Some((f.remote.to_string(), f.encode.apply(value)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_mapping() -> FieldMapping {
        FieldMapping::new(vec![
            Field::new("key", "key"),
            Field::new("name", "name"),
            Field::new("lead", "lead").updatable().compare(Compare::NamedObject),
            Field::new("description", "description")
                .updatable()
                .compare(Compare::NullableText),
        ])
        .unwrap()
    }

    #[test]
    fn test_mapping_views() {
        let mapping = project_mapping();
        assert_eq!(mapping.all_fields().len(), 4);
        let updatable: Vec<_> = mapping.updatable_fields().map(|f| f.param).collect();
        assert_eq!(updatable, vec!["lead", "description"]);
        assert_eq!(mapping.get("lead").map(|f| f.remote), Some("lead"));
        assert!(mapping.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_remote_rejected() {
        let result = FieldMapping::new(vec![
            Field::new("username", "name"),
            Field::new("display", "name"),
        ]);
        assert!(matches!(result, Err(Error::DuplicateField { remote }) if remote == "name"));
    }

    #[test]
    fn test_exact_skips_missing_sides() {
        let field = Field::new("url", "url").updatable();
        assert_eq!(field.differs(None, Some(&json!("a"))), None);
        assert_eq!(field.differs(Some(&json!("a")), None), None);
        assert_eq!(field.differs(Some(&json!("a")), Some(&json!("a"))), None);
        assert_eq!(field.differs(Some(&json!("b")), Some(&json!("a"))), Some(json!("b")));
    }

    #[test]
    fn test_exact_numeric_strings() {
        let field = Field::new("avatar_id", "avatarId").updatable();
        assert_eq!(field.differs(Some(&json!(10011)), Some(&json!("10011"))), None);
    }

    #[test]
    fn test_named_object() {
        let field = Field::new("lead", "lead").compare(Compare::NamedObject);
        let snapshot = json!({"lead": {"name": "alice", "active": true}});
        let remote = field.remote_value(&snapshot);
        assert_eq!(remote, Some(json!("alice")));
        assert_eq!(field.differs(Some(&json!("alice")), remote.as_ref()), None);
        assert_eq!(field.differs(Some(&json!("bob")), remote.as_ref()), Some(json!("bob")));
    }

    #[test]
    fn test_named_object_null_remote() {
        let field = Field::new("assignee", "assignee").compare(Compare::NamedObject);
        let remote = field.remote_value(&json!({"assignee": null}));
        assert_eq!(remote, Some(Value::Null));
        assert_eq!(field.differs(Some(&json!("bob")), remote.as_ref()), Some(json!("bob")));
    }

    #[test]
    fn test_nested_reads_from_source() {
        let field = Field::new("category_id", "categoryId")
            .read_from("projectCategory")
            .compare(Compare::Nested { key: "id" });
        let remote = field.remote_value(&json!({"projectCategory": {"id": "10000"}}));
        assert_eq!(field.differs(Some(&json!(10000)), remote.as_ref()), None);
    }

    #[test]
    fn test_nullable_text_null_equals_empty() {
        let field = Field::new("description", "description").compare(Compare::NullableText);
        assert_eq!(field.differs(None, Some(&json!(""))), None);
        assert_eq!(field.differs(Some(&json!("")), Some(&Value::Null)), None);
        assert_eq!(field.differs(None, Some(&Value::Null)), None);
    }

    #[test]
    fn test_nullable_text_writes_and_clears() {
        let field = Field::new("description", "description").compare(Compare::NullableText);
        assert_eq!(field.differs(Some(&json!("x")), Some(&Value::Null)), Some(json!("x")));
        assert_eq!(field.differs(Some(&json!("")), Some(&json!("old"))), Some(json!("")));
        assert_eq!(field.differs(Some(&json!("new")), Some(&json!("old"))), Some(json!("new")));
    }

    #[test]
    fn test_set_ignores_order() {
        let field = Field::new("users", "users").compare(Compare::Set);
        assert_eq!(field.differs(Some(&json!(["b", "a"])), Some(&json!(["a", "b"]))), None);
        assert_eq!(
            field.differs(Some(&json!(["a"])), Some(&json!(["a", "b"]))),
            Some(json!(["a"]))
        );
        assert_eq!(field.differs(Some(&json!([])), Some(&Value::Null)), None);
    }

    #[test]
    fn test_set_of_keys() {
        let field = Field::new("application_keys", "applicationKeys").compare(Compare::SetOfKeys {
            source: "applicationRoles",
            items: "items",
            key: "key",
        });
        let snapshot = json!({"applicationRoles": {"size": 2, "items": [
            {"key": "jira-software", "name": "Jira Software"},
            {"key": "jira-core", "name": "Jira Core"}
        ]}});
        let remote = field.remote_value(&snapshot);
        assert_eq!(remote, Some(json!(["jira-software", "jira-core"])));
        assert_eq!(
            field.differs(Some(&json!(["jira-core", "jira-software"])), remote.as_ref()),
            None
        );
        assert_eq!(field.remote_value(&json!({})), Some(json!([])));
    }

    #[test]
    fn test_resolved_has_no_inline_value() {
        let field = Field::new("permission_scheme", "permissionScheme")
            .compare(Compare::Resolved { suffix: "permissionscheme" });
        assert_eq!(field.remote_value(&json!({"permissionScheme": 1})), None);
    }

    #[test]
    fn test_encode() {
        assert_eq!(Encode::NamedObject.apply(&json!("bob")), json!({"name": "bob"}));
        assert_eq!(Encode::KeyedObject.apply(&json!("PRJ1")), json!({"key": "PRJ1"}));
        assert_eq!(Encode::CommaJoined.apply(&json!(["a", "b"])), json!("a,b"));
        assert_eq!(Encode::Plain.apply(&json!(3)), json!(3));
    }

    #[test]
    fn test_creation_payload_omits_blank() {
        let mapping = FieldMapping::new(vec![
            Field::new("name", "name"),
            Field::new("description", "description"),
            Field::new("users", "users"),
            Field::new("active", "active").skip_on_create(),
            Field::new("project_key", "project").encode(Encode::KeyedObject),
        ])
        .unwrap();
        let params = json!({
            "name": "n", "description": "", "users": [], "active": true, "project_key": "PRJ1"
        });
        let payload = mapping.creation_payload(|p| params.get(p));
        assert_eq!(
            Value::Object(payload),
            json!({"name": "n", "project": {"key": "PRJ1"}})
        );
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!([])));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!(0)));
    }
}
