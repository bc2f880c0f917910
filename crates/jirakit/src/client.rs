//! HTTP transport backed by `ureq`.
//!
//! [`JiraClient`] performs one blocking request per call with Basic auth and
//! JSON bodies, and translates the HTTP outcome into [`Fetched`] or
//! [`Error::Http`].

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::transport::{Fetched, Method, Query, Request, Transport};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

/// Blocking Jira REST client.
///
/// # Example
///
/// ```no_run
/// use jirakit::{ConnectionSettings, JiraClient, Query, Transport};
///
/// let config = ConnectionSettings::default().resolve().unwrap();
/// let client = JiraClient::new(&config);
/// let group = client
///     .get("rest/api/2/group/member", &Query::new().with("groupname", "developers"))
///     .unwrap();
/// println!("exists: {}", group.is_found());
/// ```
pub struct JiraClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Base URL with exactly one trailing slash.
    base_url: String,
    /// Precomputed `Authorization` header value.
    authorization: String,
}

impl JiraClient {
    /// Create a client from resolved connection settings.
    #[must_use]
    pub fn new(config: &ConnectionConfig) -> Self {
        let mut builder = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false);

        if !config.validate_certs {
            builder = builder.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }

        Self {
            agent: ureq::Agent::new_with_config(builder.build()),
            base_url: normalize_url(&config.base_url),
            authorization: basic_auth_header(&config.username, &config.password),
        }
    }

    /// Get the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for an endpoint path (without query).
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach auth, content negotiation and query parameters.
    fn prepare<B>(&self, builder: ureq::RequestBuilder<B>, query: &Query) -> ureq::RequestBuilder<B> {
        let mut builder = builder
            .header("Authorization", self.authorization.as_str())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");
        for (key, value) in query.pairs() {
            builder = builder.query(key, value);
        }
        builder
    }

    fn send(&self, request: &Request) -> Result<ureq::http::Response<ureq::Body>> {
        let url = self.url(&request.path);
        let payload = request
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let response = match request.method {
            Method::Get => self.prepare(self.agent.get(&url), &request.query).call(),
            Method::Delete => self.prepare(self.agent.delete(&url), &request.query).call(),
            Method::Post => {
                let builder = self.prepare(self.agent.post(&url), &request.query);
                match payload {
                    Some(body) => builder.send(body),
                    None => builder.send_empty(),
                }
            }
            Method::Put => {
                let builder = self.prepare(self.agent.put(&url), &request.query);
                match payload {
                    Some(body) => builder.send(body),
                    None => builder.send_empty(),
                }
            }
        };

        response.map_err(|e| Error::http(http_error_message(None, Some(&e.to_string()), None), None))
    }
}

impl Transport for JiraClient {
    fn request(&self, request: &Request) -> Result<Fetched<Value>> {
        log::debug!("Jira URL request: {request} (base {})", self.base_url);

        let mut response = self.send(request)?;
        let status = response.status();

        if status.as_u16() == 404 {
            log::debug!("{request} -> 404, treating as absent");
            return Ok(Fetched::Absent);
        }

        let text = response.body_mut().read_to_string()?;
        log::trace!("Body result: {text}");

        classify(status.as_u16(), status.canonical_reason(), &text)
    }
}

/// Map a status code and raw body to a lookup outcome.
fn classify(status: u16, reason: Option<&str>, text: &str) -> Result<Fetched<Value>> {
    match status {
        404 => Ok(Fetched::Absent),
        200 | 201 | 204 => {
            if text.trim().is_empty() {
                Ok(Fetched::Found(Value::Object(serde_json::Map::new())))
            } else {
                Ok(Fetched::Found(serde_json::from_str(text)?))
            }
        }
        _ => {
            let body = serde_json::from_str::<Value>(text).ok();
            Err(Error::http(
                http_error_message(Some(status), reason, body.as_ref()),
                Some(status),
            ))
        }
    }
}

/// Ensure the URL ends with exactly one slash.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

/// Build the value of a Basic `Authorization` header.
#[must_use]
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Aggregate everything known about a failed request into one message.
///
/// Collects the transport message, every entry of Jira's `errorMessages`
/// list and every `field: message` pair of its `errors` map.
#[must_use]
pub fn http_error_message(
    status: Option<u16>,
    transport_message: Option<&str>,
    body: Option<&Value>,
) -> String {
    let mut messages: Vec<String> = Vec::new();

    if let Some(msg) = transport_message.filter(|m| !m.is_empty()) {
        messages.push(msg.to_string());
    }

    if let Some(body) = body {
        if let Some(list) = body.get("errorMessages").and_then(Value::as_array) {
            messages.extend(list.iter().map(display_value));
        }
        if let Some(map) = body.get("errors").and_then(Value::as_object) {
            messages.extend(map.iter().map(|(k, v)| format!("{k}: {}", display_value(v))));
        }
    }

    let prefix = match status {
        Some(code) => format!("HTTP Error {code}"),
        None => "HTTP Error".to_string(),
    };

    if messages.is_empty() {
        prefix
    } else {
        format!("{prefix}: [{}]", messages.join(", "))
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
