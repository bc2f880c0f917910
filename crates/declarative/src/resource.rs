//! Resource descriptors and desired state
//!
//! A [`ResourceKind`] is plain data: the field mapping plus the addressing
//! and write strategy for one resource type. A single generic
//! [`reconcile`](crate::reconcile::reconcile) consumes it, so supporting a
//! new resource type means writing a descriptor rather than new logic.

use crate::error::{Error, Result};
use crate::mapping::FieldMapping;
use crate::types::EnsureState;
use jirakit::{Method, Query, Transport};
use serde_json::{Map, Value};
use std::fmt;

/// A resolved REST address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Endpoint path relative to the base URL
    pub path: String,
    /// Query parameters
    pub query: Query,
}

impl Address {
    /// Address without query parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Query::new(),
        }
    }

    /// Set the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// How the current remote state is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// GET a known address.
    Direct(Address),
    /// Scan `collection` for an exact `name` match, then GET `collection/<id>`.
    ByName {
        /// Collection path
        collection: String,
        /// Human-readable name
        name: String,
    },
    /// No natural key was supplied; the resource is treated as absent.
    Unaddressed,
}

/// How a fetched value is turned into the snapshot that gets compared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Use the value as fetched.
    Raw,
    /// `{actors: [{type, name}]}` becomes `{users, groups}`; no actors at all is absent.
    RoleActors,
    /// Present iff `value[list]` holds an element whose `field` equals `value`.
    Member {
        /// List key in the fetched value
        list: &'static str,
        /// Key compared in each element
        field: &'static str,
        /// Expected value
        value: String,
    },
}

/// How a created resource's canonical snapshot is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    /// Repeat the lookup.
    Refetch,
    /// Use the body of the create response.
    Response,
    /// GET `collection/<response.key>`.
    FollowKey {
        /// Collection path
        collection: String,
    },
}

/// Creation call
#[derive(Debug, Clone, PartialEq)]
pub struct Create {
    /// POST, or PUT for attached resources
    pub method: Method,
    /// Where the payload is sent
    pub address: Address,
    /// Constant fields added to every creation payload
    pub extras: Map<String, Value>,
}

impl Create {
    /// POST to `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::with_method(Method::Post, Address::new(path))
    }

    /// Create with an explicit method and address.
    pub fn with_method(method: Method, address: Address) -> Self {
        Self {
            method,
            address,
            extras: Map::new(),
        }
    }

    /// Add a constant field.
    #[must_use]
    pub fn extra(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(field.into(), value.into());
        self
    }
}

/// A field added to an update payload whenever `trigger` changes
#[derive(Debug, Clone, PartialEq)]
pub struct Companion {
    /// Remote field whose change triggers the companion
    pub trigger: &'static str,
    /// Remote field added
    pub field: &'static str,
    /// Constant value
    pub value: Value,
}

/// Update call
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// PUT, or POST for partial-update endpoints
    pub method: Method,
    /// Companion fields
    pub companions: Vec<Companion>,
    /// Send every updatable field instead of just the changed ones
    pub full: bool,
}

impl Default for Update {
    fn default() -> Self {
        Self {
            method: Method::Put,
            companions: Vec::new(),
            full: false,
        }
    }
}

/// How a resource is removed
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// DELETE the resolved address, or an explicit one.
    Delete(Option<Address>),
    /// PUT a clearing payload to the resolved address.
    Clear(Value),
}

impl Removal {
    /// Whether the resource is attached to a parent and cleared instead of deleted.
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear(_))
    }
}

/// Descriptor configuring the generic reconciler for one resource type
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceKind {
    /// Resource kind, e.g. `project`
    pub kind: &'static str,
    /// Natural key, for reporting
    pub name: String,
    /// Field mapping
    pub fields: FieldMapping,
    /// Where the current state lives
    pub lookup: Lookup,
    /// Snapshot projection
    pub projection: Projection,
    /// Creation call
    pub create: Create,
    /// How a create is confirmed
    pub confirm: Confirm,
    /// Update call
    pub update: Update,
    /// Removal strategy
    pub removal: Removal,
    /// Key wrapping every write payload, e.g. `fields`
    pub envelope: Option<&'static str>,
    /// Key of the snapshot holding comparable fields, e.g. `fields`
    pub scope: Option<&'static str>,
}

impl ResourceKind {
    /// Descriptor with a refetch confirm, PUT updates and DELETE removal.
    pub fn new(kind: &'static str, name: impl Into<String>, fields: FieldMapping, lookup: Lookup, create: Create) -> Self {
        Self {
            kind,
            name: name.into(),
            fields,
            lookup,
            projection: Projection::Raw,
            create,
            confirm: Confirm::Refetch,
            update: Update::default(),
            removal: Removal::Delete(None),
            envelope: None,
            scope: None,
        }
    }

    /// Set the snapshot projection.
    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set how a create is confirmed.
    #[must_use]
    pub fn confirm(mut self, confirm: Confirm) -> Self {
        self.confirm = confirm;
        self
    }

    /// Set the update method.
    #[must_use]
    pub fn update_method(mut self, method: Method) -> Self {
        self.update.method = method;
        self
    }

    /// Add `field: value` to updates whenever `trigger` changes.
    #[must_use]
    pub fn companion(mut self, trigger: &'static str, field: &'static str, value: impl Into<Value>) -> Self {
        self.update.companions.push(Companion {
            trigger,
            field,
            value: value.into(),
        });
        self
    }

    /// Send every updatable field on update.
    #[must_use]
    pub fn full_update(mut self) -> Self {
        self.update.full = true;
        self
    }

    /// Set the removal strategy.
    #[must_use]
    pub fn removal(mut self, removal: Removal) -> Self {
        self.removal = removal;
        self
    }

    /// Wrap write payloads in `{envelope: ...}`.
    #[must_use]
    pub fn envelope(mut self, key: &'static str) -> Self {
        self.envelope = Some(key);
        self
    }

    /// Compare fields found under `snapshot[key]`.
    #[must_use]
    pub fn scope(mut self, key: &'static str) -> Self {
        self.scope = Some(key);
        self
    }

    /// Wrap a payload in the envelope, if any.
    pub fn wrap(&self, payload: Map<String, Value>) -> Value {
        match self.envelope {
            Some(key) => {
                let mut outer = Map::new();
                outer.insert(key.to_string(), Value::Object(payload));
                Value::Object(outer)
            }
            None => Value::Object(payload),
        }
    }

    /// The part of a snapshot that fields are compared against.
    pub fn scoped<'a>(&self, snapshot: &'a Value) -> &'a Value {
        match self.scope {
            Some(key) => snapshot.get(key).unwrap_or(&Value::Null),
            None => snapshot,
        }
    }
}

/// Caller-supplied target configuration for one resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    /// Whether the resource should exist
    pub state: EnsureState,
    params: Map<String, Value>,
}

impl DesiredState {
    /// Desired state without parameters.
    pub fn new(state: EnsureState) -> Self {
        Self {
            state,
            params: Map::new(),
        }
    }

    /// Build from a JSON object of params plus an optional `state` key.
    pub fn from_value(kind: &str, value: Value) -> Result<Self> {
        let Value::Object(mut params) = value else {
            return Err(Error::invalid(kind, "*", "parameters must be an object"));
        };

        let state = match params.remove("state") {
            None | Some(Value::Null) => EnsureState::default(),
            Some(state) => serde_json::from_value(state)
                .map_err(|_| Error::invalid(kind, "state", "expected 'present' or 'absent'"))?,
        };

        Ok(Self { state, params })
    }

    /// Set a parameter.
    #[must_use]
    pub fn with(mut self, param: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(param.into(), value.into());
        self
    }

    /// A supplied, non-null parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name).filter(|v| !v.is_null())
    }

    /// A supplied string parameter.
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Value::as_str)
    }

    /// All parameters.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

/// A reconcilable resource: typed parameters that produce a descriptor
///
/// Building the descriptor may need remote lookups (e.g. resolving a
/// role name to its id); a lookup that must succeed and does not fails
/// with `NotFound` before anything is changed.
pub trait Resource: Send + Sync + fmt::Debug {
    /// Resource kind, e.g. `group`
    fn kind(&self) -> &'static str;

    /// Natural key used for reporting and target filtering
    fn name(&self) -> String;

    /// Desired state derived from the parameters
    fn desired(&self) -> Result<DesiredState>;

    /// Build the descriptor, running any required name lookups
    fn descriptor(&self, transport: &dyn Transport) -> Result<ResourceKind>;

    /// `kind.name`
    fn id(&self) -> String {
        format!("{}.{}", self.kind(), self.name())
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
