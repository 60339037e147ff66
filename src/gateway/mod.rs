//! HTTP/WebSocket front door.
//!
//! The gateway proxies CRUD to the hosted store, serves reads from the
//! incident cache service, routes chat messages between canned responses
//! and the RAG answer service, and fans out change events to WebSocket
//! clients.

mod handlers;
mod ws;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cache::client::CacheClient;
use crate::config::Config;
use crate::rag::RagClient;
use crate::store::StoreClient;

pub use ws::ConnectionRegistry;

/// Shared application state passed to all route handlers.
pub struct AppState {
    pub config: Config,
    pub store: StoreClient,
    pub cache: CacheClient,
    pub rag: RagClient,
    pub registry: ConnectionRegistry,
}

/// Run the gateway on the configured bind address.
pub async fn run_server(config: Config) -> Result<()> {
    let store_url = config.store.resolve_url();
    if store_url.is_empty() {
        tracing::warn!("Store URL not configured; CRUD operations will fail");
    }
    let store_key = config.store.resolve_key().unwrap_or_default();

    let store = StoreClient::new(
        &store_url,
        &store_key,
        Duration::from_secs(config.store.timeout_secs),
    )?;
    let cache = CacheClient::new(
        &config.cache.service_url,
        Duration::from_secs(config.store.timeout_secs),
    )?;
    let rag = RagClient::new(
        &config.rag.answer_url,
        Duration::from_secs(config.rag.timeout_secs),
        Duration::from_secs(config.rag.probe_timeout_secs),
    )?;

    let bind = config.gateway.bind.clone();
    let state = Arc::new(AppState {
        config,
        store,
        cache,
        rag,
        registry: ConnectionRegistry::new(),
    });

    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    tracing::info!("Gateway listening on {bind}");

    axum::serve(listener, app).await.context("Gateway error")?;

    Ok(())
}
