//! HTTP client for the viewer backend.
//!
//! No view awareness — just issues GETs via reqwest and applies the
//! success range.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{is_success_status, DataService, Payload, Request, ServiceError};

/// Default backend address (the viewer's default port).
pub const DEFAULT_BASE_URL: &str = "http://localhost:55123";

/// [`DataService`] over plain HTTP GETs.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    http: Client,
    base_url: String,
}

impl HttpDataService {
    /// Create a service against the default local backend.
    pub fn new() -> Result<Self, ServiceError> {
        Self::with_base_url(DEFAULT_BASE_URL, None)
    }

    /// Create a service against `base_url`. No timeout unless one is given.
    pub fn with_base_url(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let trimmed = base_url.trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ServiceError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &Request) -> String {
        format!("{}{}", self.base_url, request.path_and_query())
    }
}

#[async_trait]
impl DataService for HttpDataService {
    async fn fetch(&self, request: &Request) -> Result<Payload, ServiceError> {
        let url = self.url_for(request);
        debug!(%url, "fetch");

        let response = self.http.get(&url).send().await?;
        let status = response.status().as_u16();

        if !is_success_status(status) {
            warn!(%url, status, "fetch failed");
            return Err(ServiceError::Status {
                status,
                request: request.path_and_query(),
            });
        }

        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "fetch complete");
        Ok(Payload::from(body))
    }
}
