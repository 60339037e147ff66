//! Incident cache query service.
//!
//! Serves the in-process snapshot over HTTP for the gateway (and anything
//! else that wants the same view the RAG pipeline ingests). Requests never
//! touch the hosted store: every read is a clone of the last published
//! snapshot `Arc`.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::IncidentCache;
use crate::types::Incident;

/// Run the query service on the given bind address.
pub async fn run_server(cache: IncidentCache, bind: &str) -> Result<()> {
    let app = router(cache);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    tracing::info!("Incident cache query service listening on {bind}");

    axum::serve(listener, app)
        .await
        .context("Cache query service error")?;

    Ok(())
}

fn router(cache: IncidentCache) -> Router {
    Router::new()
        .route("/incidents", get(incidents))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(cache)
}

async fn incidents(State(cache): State<IncidentCache>) -> Json<Vec<Incident>> {
    Json(cache.snapshot().await.incidents.clone())
}

#[derive(Serialize)]
struct HealthBody {
    status: String,
    incidents_count: usize,
}

async fn health(State(cache): State<IncidentCache>) -> Json<HealthBody> {
    let snapshot = cache.snapshot().await;
    Json(HealthBody {
        status: "ok".to_string(),
        incidents_count: snapshot.incidents.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::client::CacheClient;
    use crate::cache::Snapshot;
    use std::time::Duration;

    async fn spawn_service(cache: IncidentCache) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(cache)).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn incident(id: &str) -> Incident {
        Incident {
            incident_id: Some(id.to_string()),
            title: Some("test".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_incidents_empty_before_first_poll() {
        let url = spawn_service(IncidentCache::new()).await;
        let client = CacheClient::new(&url, Duration::from_secs(2)).unwrap();

        let incidents = client.incidents().await.unwrap();
        assert!(incidents.is_empty());

        let health: serde_json::Value = reqwest::get(format!("{url}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["incidents_count"], 0);
    }

    #[tokio::test]
    async fn test_incidents_reflect_published_snapshot() {
        let cache = IncidentCache::new();
        cache
            .publish(Snapshot::new(vec![
                incident("INC-20250101-120000"),
                incident("INC-20250102-130000"),
            ]))
            .await;

        let url = spawn_service(cache).await;
        let client = CacheClient::new(&url, Duration::from_secs(2)).unwrap();

        let incidents = client.incidents().await.unwrap();
        assert_eq!(incidents.len(), 2);

        let health: serde_json::Value = reqwest::get(format!("{url}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["incidents_count"], 2);
    }
}
