//! Client for the hosted incident store.
//!
//! The store exposes a PostgREST-style REST interface; all reads filter
//! out soft-deleted rows server-side (`deleted_at=is.null`) and all writes
//! go through here. Errors are typed so callers can branch on
//! unreachable vs not-found vs rejected-filter without string matching.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::types::Incident;

/// Errors from the hosted store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("store unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// A write targeted an incident the store does not have.
    #[error("incident not found: {incident_id}")]
    NotFound { incident_id: String },

    /// The store answered with a non-success status (bad filter syntax,
    /// constraint violation, auth failure).
    #[error("store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The store answered 2xx but the body did not parse.
    #[error("failed to decode store response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// HTTP client for the hosted incident store.
pub struct StoreClient {
    base_url: String,
    key: String,
    http: reqwest::Client,
    probe_timeout: Duration,
}

impl StoreClient {
    /// Create a client for the given store URL and API key.
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http,
            probe_timeout: Duration::from_secs(2),
        })
    }

    fn incidents_url(&self) -> String {
        format!("{}/rest/v1/incidents", self.base_url)
    }

    /// Fetch the full active incident set, newest insertions first.
    pub async fn list_incidents(&self, limit: usize) -> Result<Vec<Incident>, StoreError> {
        self.fetch_rows(&[
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
            ("deleted_at", "is.null".to_string()),
        ])
        .await
    }

    /// Fetch the most recently updated active incidents.
    pub async fn recent_updates(&self, limit: usize) -> Result<Vec<Incident>, StoreError> {
        self.fetch_rows(&[
            ("select", "*".to_string()),
            ("order", "updated_at.desc".to_string()),
            ("limit", limit.to_string()),
            ("deleted_at", "is.null".to_string()),
        ])
        .await
    }

    /// Case-insensitive substring search across title, description, and
    /// location. Falls back to a title-only match if the combined filter
    /// fails for any reason.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Incident>, StoreError> {
        let term = sanitize_filter_term(query);

        let combined = self
            .fetch_rows(&[
                ("deleted_at", "is.null".to_string()),
                ("or", combined_filter(&term)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .await;

        match combined {
            Ok(rows) => Ok(rows),
            Err(err) => {
                tracing::warn!("Combined search filter failed, retrying title-only: {err}");
                self.fetch_rows(&[
                    ("deleted_at", "is.null".to_string()),
                    ("title", format!("ilike.*{term}*")),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ])
                .await
            }
        }
    }

    /// Insert a new incident row, returning the stored representation.
    pub async fn insert(&self, record: &Incident) -> Result<Incident, StoreError> {
        let resp = self
            .http
            .post(self.incidents_url())
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(StoreError::Unreachable)?;

        let rows = decode_rows(resp).await?;
        rows.into_iter().next().ok_or(StoreError::Rejected {
            status: 200,
            body: "empty representation".to_string(),
        })
    }

    /// Apply a partial update to the row with the given incident
    /// identifier. An empty representation means the target is missing.
    pub async fn update_by_incident_id(
        &self,
        incident_id: &str,
        patch: &Value,
    ) -> Result<Incident, StoreError> {
        let resp = self
            .http
            .patch(self.incidents_url())
            .query(&[("incident_id", format!("eq.{incident_id}"))])
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(StoreError::Unreachable)?;

        let rows = decode_rows(resp).await?;
        rows.into_iter().next().ok_or_else(|| StoreError::NotFound {
            incident_id: incident_id.to_string(),
        })
    }

    /// Quick reachability probe against the REST root.
    pub async fn health(&self) -> Result<(), StoreError> {
        let resp = self
            .http
            .get(format!("{}/rest/v1/", self.base_url))
            .header("apikey", &self.key)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(StoreError::Unreachable)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                status: resp.status().as_u16(),
                body: String::new(),
            })
        }
    }

    async fn fetch_rows(&self, params: &[(&str, String)]) -> Result<Vec<Incident>, StoreError> {
        let resp = self
            .http
            .get(self.incidents_url())
            .query(params)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await
            .map_err(StoreError::Unreachable)?;

        decode_rows(resp).await
    }
}

async fn decode_rows(resp: reqwest::Response) -> Result<Vec<Incident>, StoreError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    resp.json().await.map_err(StoreError::Decode)
}

/// Build the PostgREST `or=` filter matching the term against title,
/// description, and location.
fn combined_filter(term: &str) -> String {
    format!("(title.ilike.*{term}*,description.ilike.*{term}*,location.ilike.*{term}*)")
}

/// Strip characters that are metasyntax inside a PostgREST filter
/// expression so user input cannot break the `or=(...)` grouping.
fn sanitize_filter_term(query: &str) -> String {
    query
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}
