//! Transport abstraction.
//!
//! The [`Transport`] trait is the single seam between the reconciliation
//! logic and the network. [`JiraClient`](crate::JiraClient) implements it
//! over HTTP and [`MockTransport`](crate::MockTransport) implements it in
//! memory for tests.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP method used by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read a resource or collection.
    Get,
    /// Create a resource (or partially update, for some endpoints).
    Post,
    /// Update or replace a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl Method {
    /// Whether this method changes remote state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Get)
    }

    /// Upper-case method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered query parameters.
///
/// Values are kept raw; the HTTP client urlencodes them when building the
/// request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter only when a value is present.
    #[must_use]
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.push(key, v);
        }
        self
    }

    /// Append a parameter in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Look up the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the parameters in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// One request against the Jira REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Endpoint path relative to the base URL, e.g. `rest/api/2/group`.
    pub path: String,
    /// Query parameters.
    pub query: Query,
    /// JSON payload.
    pub body: Option<Value>,
}

impl Request {
    /// Create a request without query or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
        }
    }

    /// Set the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Set the JSON payload.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// Outcome of a lookup: the resource, or the fact that it does not exist.
///
/// A 404 from Jira is reported as [`Fetched::Absent`], never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The resource exists.
    Found(T),
    /// The resource does not exist.
    Absent,
}

impl<T> Fetched<T> {
    /// Whether the resource exists.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Whether the resource does not exist.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Borrow the found value.
    #[must_use]
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::Absent => None,
        }
    }

    /// Map the found value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Self::Found(v) => Fetched::Found(f(v)),
            Self::Absent => Fetched::Absent,
        }
    }
}

impl<T> From<Option<T>> for Fetched<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Found(v),
            None => Self::Absent,
        }
    }
}

/// Transport trait for talking to Jira.
///
/// Implementations perform exactly one HTTP exchange per call, without
/// retries or caching.
pub trait Transport: Send + Sync {
    /// Perform a request.
    ///
    /// Returns [`Fetched::Absent`] on 404, the parsed body (or `{}` for an
    /// empty body) on 200/201/204, and [`Error::Http`](crate::Error::Http)
    /// for every other status.
    fn request(&self, request: &Request) -> Result<Fetched<Value>>;

    /// GET `path` with `query`.
    fn get(&self, path: &str, query: &Query) -> Result<Fetched<Value>> {
        self.request(&Request::new(Method::Get, path).with_query(query.clone()))
    }

    /// POST `body` to `path`.
    fn post(&self, path: &str, query: &Query, body: Value) -> Result<Fetched<Value>> {
        self.request(
            &Request::new(Method::Post, path)
                .with_query(query.clone())
                .with_body(body),
        )
    }

    /// PUT `body` to `path`.
    fn put(&self, path: &str, query: &Query, body: Value) -> Result<Fetched<Value>> {
        self.request(
            &Request::new(Method::Put, path)
                .with_query(query.clone())
                .with_body(body),
        )
    }

    /// DELETE `path`.
    fn delete(&self, path: &str, query: &Query) -> Result<Fetched<Value>> {
        self.request(&Request::new(Method::Delete, path).with_query(query.clone()))
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(&self, request: &Request) -> Result<Fetched<Value>> {
        (**self).request(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn request(&self, request: &Request) -> Result<Fetched<Value>> {
        (**self).request(request)
    }
}
