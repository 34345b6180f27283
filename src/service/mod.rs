//! Data service — the four logical fetch endpoints of the viewer backend.
//!
//! The backend renders everything; this side only asks for fragments and
//! hands the raw body back. Every call is one GET round trip that resolves
//! exactly once, with the payload or with a [`ServiceError`].

pub mod client;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::HttpDataService;

/// Message shown when a fetch fails and nobody handled the failure.
pub const VIEWER_STOPPED_MSG: &str = "Viewer stopped (restart wwiser's viewer)";

/// Opaque renderable fragment returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Payload {
    fn from(body: String) -> Self {
        Self(body)
    }
}

impl From<&str> for Payload {
    fn from(body: &str) -> Self {
        Self(body.to_string())
    }
}

/// Documentation pages served by `/load-docs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocName {
    Readme,
    Wwiser,
}

impl DocName {
    pub fn as_str(self) -> &'static str {
        match self {
            DocName::Readme => "readme",
            DocName::Wwiser => "wwiser",
        }
    }
}

/// One logical request against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Bank tree; `include_all` lifts the default per-list scoping.
    BankList { include_all: bool },
    /// Simplified bank listing.
    SimpleList { include_all: bool },
    /// Detail fragment for one node placeholder.
    Node { id: String },
    /// Rendered documentation page.
    Doc(DocName),
}

impl Request {
    /// Path plus query string, relative to the backend base URL.
    pub fn path_and_query(&self) -> String {
        match self {
            Request::BankList { include_all: false } => "/load-banks".into(),
            Request::BankList { include_all: true } => "/load-banks?all=true".into(),
            Request::SimpleList { include_all: false } => "/load-banks?simple=true".into(),
            Request::SimpleList { include_all: true } => {
                "/load-banks?all=true&simple=true".into()
            }
            Request::Node { id } => format!("/load-node?id={}", urlencoding::encode(id)),
            Request::Doc(doc) => format!("/load-docs?doc={}", doc.as_str()),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_and_query())
    }
}

/// Errors from a backend fetch.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status} for {request}")]
    Status { status: u16, request: String },

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Whether an HTTP status counts as a successful fetch.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Source of viewer fragments.
///
/// Implementors provide [`DataService::fetch`]; the named operations are
/// thin wrappers that build the matching [`Request`].
#[async_trait]
pub trait DataService: Send + Sync {
    /// Issue one round trip for `request`.
    async fn fetch(&self, request: &Request) -> Result<Payload, ServiceError>;

    async fn fetch_bank_list(&self, include_all: bool) -> Result<Payload, ServiceError> {
        self.fetch(&Request::BankList { include_all }).await
    }

    async fn fetch_simple_list(&self, include_all: bool) -> Result<Payload, ServiceError> {
        self.fetch(&Request::SimpleList { include_all }).await
    }

    async fn fetch_node(&self, id: &str) -> Result<Payload, ServiceError> {
        self.fetch(&Request::Node { id: id.to_string() }).await
    }

    async fn fetch_doc(&self, doc: DocName) -> Result<Payload, ServiceError> {
        self.fetch(&Request::Doc(doc)).await
    }
}
