//! Thin client for the incident cache query service.
//!
//! The gateway reads incidents through this client so list reads stay
//! consistent with what the RAG answer pipeline sees. Connection failures
//! are distinguished from other failures because the gateway falls back
//! to a direct store query only when the cache service is down.

use std::time::Duration;

use thiserror::Error;

use crate::types::Incident;

/// Errors from the cache query service.
#[derive(Debug, Error)]
pub enum CacheServiceError {
    /// The service is not running or not reachable.
    #[error("cache service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The service answered but the response was unusable.
    #[error("cache service request failed: {0}")]
    Failed(String),
}

/// HTTP client for the cache query service.
pub struct CacheClient {
    base_url: String,
    http: reqwest::Client,
}

impl CacheClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch the full cached incident list.
    pub async fn incidents(&self) -> Result<Vec<Incident>, CacheServiceError> {
        let resp = self
            .http
            .get(format!("{}/incidents", self.base_url))
            .send()
            .await
            .map_err(map_transport)?;

        if !resp.status().is_success() {
            return Err(CacheServiceError::Failed(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| CacheServiceError::Failed(e.to_string()))
    }

}

// Only true connection failures trigger the gateway's store fallback;
// timeouts and protocol errors take the empty-list recovery path instead.
fn map_transport(err: reqwest::Error) -> CacheServiceError {
    if err.is_connect() {
        CacheServiceError::Unreachable(err)
    } else {
        CacheServiceError::Failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = CacheClient::new("http://localhost:8082/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8082");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let client = CacheClient::new("http://127.0.0.1:19997", Duration::from_secs(1)).unwrap();
        let result = client.incidents().await;
        assert!(matches!(result, Err(CacheServiceError::Unreachable(_))));
    }
}
