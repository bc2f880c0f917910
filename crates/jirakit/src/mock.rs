//! In-memory transport for testing without network access.
//!
//! ```
//! use jirakit::{Fetched, Method, MockTransport, Query, Transport};
//! use serde_json::json;
//!
//! let mut mock = MockTransport::new();
//! mock.absent(Method::Get, "rest/api/2/group/member");
//!
//! let group = mock
//!     .get("rest/api/2/group/member", &Query::new().with("groupname", "g1"))
//!     .unwrap();
//! assert_eq!(group, Fetched::Absent);
//! assert_eq!(mock.calls(), vec!["GET rest/api/2/group/member?groupname=g1"]);
//! ```

use crate::client::http_error_message;
use crate::error::{Error, Result};
use crate::transport::{Fetched, Method, Request, Transport};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

/// A scripted response.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// 2xx with this body.
    Found(Value),
    /// 404.
    Absent,
    /// Any other status with a JSON error body.
    Error {
        /// HTTP status.
        status: u16,
        /// Jira error body (`errorMessages`/`errors`).
        body: Value,
    },
}

/// Mock transport.
///
/// Responses are queued per `(method, path)`. Each request consumes the
/// front of its queue, except that the last entry is sticky and answers
/// every later request. Every request is recorded, including the ones that
/// had no scripted response.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<(Method, String), VecDeque<MockResponse>>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    /// Create a mock with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method path`.
    pub fn respond(&mut self, method: Method, path: impl Into<String>, response: MockResponse) -> &mut Self {
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        responses
            .entry((method, path.into()))
            .or_default()
            .push_back(response);
        drop(responses);
        self
    }

    /// Queue a 2xx response carrying `body`.
    pub fn found(&mut self, method: Method, path: impl Into<String>, body: Value) -> &mut Self {
        self.respond(method, path, MockResponse::Found(body))
    }

    /// Queue a 404 response.
    pub fn absent(&mut self, method: Method, path: impl Into<String>) -> &mut Self {
        self.respond(method, path, MockResponse::Absent)
    }

    /// Queue an error response.
    pub fn fail(&mut self, method: Method, path: impl Into<String>, status: u16, body: Value) -> &mut Self {
        self.respond(method, path, MockResponse::Error { status, body })
    }

    /// All recorded requests, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Recorded requests that would change remote state.
    #[must_use]
    pub fn mutations(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.is_mutation())
            .collect()
    }

    /// Recorded requests rendered as `"METHOD path?query"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.requests().iter().map(ToString::to_string).collect()
    }

    /// Forget recorded requests, keeping scripted responses.
    pub fn clear_requests(&mut self) {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Transport for MockTransport {
    fn request(&self, request: &Request) -> Result<Fetched<Value>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());

        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = responses
            .get_mut(&(request.method, request.path.clone()))
            .ok_or_else(|| Error::InvalidResponse(format!("mock response not configured: {request}")))?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
        .ok_or_else(|| Error::InvalidResponse(format!("mock response not configured: {request}")))?;

        match response {
            MockResponse::Found(body) => Ok(Fetched::Found(body)),
            MockResponse::Absent => Ok(Fetched::Absent),
            MockResponse::Error { status, body } => Err(Error::http(
                http_error_message(Some(status), None, Some(&body)),
                Some(status),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Query;
    use serde_json::json;

    #[test]
    fn test_mock_unscripted_is_error() {
        let mock = MockTransport::new();
        let result = mock.get("rest/api/2/role", &Query::new());
        assert!(matches!(result, Err(Error::InvalidResponse(_))));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_mock_queue_then_sticky() {
        let mut mock = MockTransport::new();
        mock.absent(Method::Get, "rest/api/2/group/member")
            .found(Method::Get, "rest/api/2/group/member", json!({"values": []}));

        let q = Query::new();
        assert!(mock.get("rest/api/2/group/member", &q).unwrap().is_absent());
        assert!(mock.get("rest/api/2/group/member", &q).unwrap().is_found());
        assert!(mock.get("rest/api/2/group/member", &q).unwrap().is_found());
    }

    #[test]
    fn test_mock_error_response() {
        let mut mock = MockTransport::new();
        mock.fail(
            Method::Post,
            "rest/api/2/group",
            400,
            json!({"errorMessages": ["A group with that name already exists."]}),
        );

        let err = mock
            .post("rest/api/2/group", &Query::new(), json!({"name": "g1"}))
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "HTTP Error 400: [A group with that name already exists.]"
        );
    }

    #[test]
    fn test_mock_records_mutations() {
        let mut mock = MockTransport::new();
        mock.found(Method::Get, "rest/api/2/role", json!([]))
            .found(Method::Delete, "rest/api/2/role/1", json!({}));

        mock.get("rest/api/2/role", &Query::new()).unwrap();
        mock.delete("rest/api/2/role/1", &Query::new()).unwrap();

        let mutations = mock.mutations();
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].method, Method::Delete);

        mock.clear_requests();
        assert!(mock.requests().is_empty());
    }
}
