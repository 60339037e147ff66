//! Client for the external RAG answer service.
//!
//! The answer pipeline is an opaque collaborator: it ingests the artifact
//! directory on its own and exposes `POST /v2/answer`. This client only
//! ships prompts and returns answer text. The request timeout is generous
//! because upstream inference is slow; connection failures are a distinct
//! variant so the chat handler can answer with a fixed placeholder instead
//! of an error status.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors from the answer service.
#[derive(Debug, Error)]
pub enum RagError {
    /// The service is not running or not reachable.
    #[error("answer service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The service answered but the exchange failed (timeout, bad status,
    /// unparseable body).
    #[error("answer request failed: {0}")]
    Failed(String),
}

#[derive(Deserialize)]
struct AnswerBody {
    #[serde(default)]
    response: Option<String>,
}

/// HTTP client for the RAG answer service.
pub struct RagClient {
    base_url: String,
    http: reqwest::Client,
    probe_timeout: Duration,
}

impl RagClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        probe_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            probe_timeout,
        })
    }

    /// Submit a prompt and return the answer text.
    pub async fn answer(&self, prompt: &str) -> Result<String, RagError> {
        let resp = self
            .http
            .post(format!("{}/v2/answer", self.base_url))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RagError::Failed(format!("HTTP {status}")));
        }

        let body: AnswerBody = resp
            .json()
            .await
            .map_err(|e| RagError::Failed(e.to_string()))?;

        Ok(body
            .response
            .unwrap_or_else(|| "No response from the answer service".to_string()))
    }

    /// Quick reachability probe against the service root.
    pub async fn health(&self) -> Result<(), RagError> {
        let resp = self
            .http
            .get(format!("{}/", self.base_url))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(map_transport)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(RagError::Failed(format!("HTTP {}", resp.status())))
        }
    }
}

fn map_transport(err: reqwest::Error) -> RagError {
    if err.is_connect() {
        RagError::Unreachable(err)
    } else {
        RagError::Failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_body_defaults_when_response_missing() {
        let body: AnswerBody = serde_json::from_str("{}").unwrap();
        assert!(body.response.is_none());

        let body: AnswerBody = serde_json::from_str(r#"{"response": "hi"}"#).unwrap();
        assert_eq!(body.response.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let client = RagClient::new(
            "http://127.0.0.1:19996",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        let result = client.answer("hello").await;
        assert!(matches!(result, Err(RagError::Unreachable(_))));
    }
}
