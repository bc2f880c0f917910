//! # jirakit
//!
//! Blocking client for the Jira Server/Data Center REST API (v2).
//!
//! This crate provides:
//! - Connection settings with environment fallback (`JIRA_URL`,
//!   `JIRA_USERNAME`, `JIRA_PASSWORD`)
//! - A [`Transport`] seam with an HTTP implementation ([`JiraClient`]) and
//!   an in-memory one ([`MockTransport`])
//! - Response classification: 404 is [`Fetched::Absent`], other failures
//!   are [`Error::Http`] with Jira's messages aggregated
//! - Read-only lookups ([`Fact`])
//!
//! ## Example
//!
//! ```no_run
//! use jirakit::{ConnectionSettings, Fact, JiraClient};
//!
//! let config = ConnectionSettings {
//!     url: Some("https://jira.example.com".into()),
//!     ..Default::default()
//! }
//! .resolve()
//! .expect("connection settings");
//!
//! let client = JiraClient::new(&config);
//! let roles = Fact::ListRoles.gather(&client).expect("list roles");
//! println!("{roles:?}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod facts;
pub mod mock;
pub mod transport;

pub use client::JiraClient;
pub use config::{ConnectionConfig, ConnectionSettings};
pub use error::{Error, ErrorCategory, Result};
pub use facts::{Fact, id_string, resolve_id};
pub use mock::{MockResponse, MockTransport};
pub use transport::{Fetched, Method, Query, Request, Transport};
