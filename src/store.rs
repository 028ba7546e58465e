//! Read-only access to the hosted price view.
//!
//! [`CardStore`] is the seam between the search logic and the network: the
//! executor only ever asks a store to run one filtered request. [`RestStore`]
//! is the real implementation, a blocking reqwest client that sends the
//! public key on every call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{LookupError, Result};
use crate::filter_builder::FilterBuilder;
use crate::models::CardRecord;

// ---------------------------------------------------------------------------
// StoreRequest
// ---------------------------------------------------------------------------

/// One filtered read: a view path plus ordered PostgREST query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl StoreRequest {
    /// Value of the first query pair named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<&FilterBuilder> for StoreRequest {
    fn from(qb: &FilterBuilder) -> Self {
        let (path, query) = qb.build();
        Self { path, query }
    }
}

impl fmt::Display for StoreRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}?{}", self.path, query.join("&"))
    }
}

// ---------------------------------------------------------------------------
// CardStore
// ---------------------------------------------------------------------------

/// Something that can answer a filtered read against the price view.
pub trait CardStore: Send + Sync {
    /// Run one request and return its rows.
    ///
    /// Any non-2xx response, transport failure or undecodable body is an error.
    fn fetch(&self, request: &StoreRequest) -> Result<Vec<CardRecord>>;
}

impl<S: CardStore + ?Sized> CardStore for Arc<S> {
    fn fetch(&self, request: &StoreRequest) -> Result<Vec<CardRecord>> {
        (**self).fetch(request)
    }
}

// ---------------------------------------------------------------------------
// RestStore
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the hosted price view.
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestStore {
    /// Create a store for `base_url` authenticated with the public `api_key`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl CardStore for RestStore {
    fn fetch(&self, request: &StoreRequest) -> Result<Vec<CardRecord>> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(request = %request, "querying price view");

        let resp = self
            .client
            .get(&url)
            .query(&request.query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            let body = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("").to_string()
            } else {
                text
            };
            tracing::warn!(status = status.as_u16(), body = %body, "price view request failed");
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<CardRecord> = resp.json()?;
        tracing::debug!(rows = rows.len(), "price view answered");
        Ok(rows)
    }
}

impl fmt::Debug for RestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
