//! HTTP request handlers for the gateway REST API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::client::CacheServiceError;
use crate::chat::{
    analyze_answer, build_prompt, detect_greeting, detect_query_mode, enhance_query, ChatTurn,
    QueryMode,
};
use crate::ident;
use crate::rag::RagError;
use crate::store::StoreError;
use crate::types::{Incident, IncidentView, Severity, Status, DEFAULT_ORG_ID, DEFAULT_REPORTER_ID};

use super::{ws, AppState};

/// Label reported as `dataSource` on chat responses.
const DATA_SOURCE: &str = "Supabase";

/// Build the axum router with all routes
pub(super) fn router(state: Arc<AppState>) -> Router {
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/incidents", get(list_incidents).post(create_incident))
        .route("/api/incidents/search", get(search_incidents))
        .route("/api/live-updates", get(live_updates))
        .route(
            "/api/incidents/{id}",
            axum::routing::patch(update_incident).delete(delete_incident),
        )
        .route("/api/incidents/{id}/soft-delete", post(soft_delete_incident))
        .route("/api/chat", post(chat))
        .route("/ws/incidents", get(ws::ws_incidents))
        .route("/ws/updates", get(ws::ws_updates))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Map store errors to HTTP responses. Not-found surfaces as 404 with the
/// identifier echoed; everything else keeps the store's verdict.
fn store_error(err: StoreError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Rejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        StoreError::Unreachable(_) => StatusCode::BAD_GATEWAY,
        StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Store error: {err}");
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

fn to_views(incidents: Vec<Incident>) -> Vec<IncidentView> {
    incidents
        .iter()
        .filter(|inc| !inc.is_deleted())
        .map(Incident::to_view)
        .collect()
}

// -- / --

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Beacon Incident Intelligence API",
        "architecture": "UI -> gateway (CRUD) -> store | UI -> gateway -> RAG cache (reads)",
        "endpoints": {
            "crud": "/api/incidents",
            "search": "/api/incidents/search",
            "chat": "/api/chat",
            "websocket": "/ws/incidents",
        },
    }))
}

// -- /api/health --

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    rag: String,
    store: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (rag, store) = tokio::join!(state.rag.health(), state.store.health());

    let rag = match rag {
        Ok(()) => "running",
        Err(RagError::Unreachable(_)) => "unreachable",
        Err(_) => "error",
    };
    let store = match store {
        Ok(()) => "connected",
        Err(StoreError::Unreachable(_)) => "unreachable",
        Err(_) => "error",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "Beacon Incident Intelligence API".to_string(),
        rag: rag.to_string(),
        store: store.to_string(),
    })
}

// -- /api/incidents (GET) --

/// Reads come from the cache service first so list views stay consistent
/// with what the answer pipeline sees. A direct store query is the
/// fallback when the cache service is down; anything else degrades to an
/// empty list rather than an error.
async fn list_incidents(State(state): State<Arc<AppState>>) -> Json<Vec<IncidentView>> {
    match state.cache.incidents().await {
        Ok(incidents) => Json(to_views(incidents)),
        Err(CacheServiceError::Unreachable(err)) => {
            tracing::warn!("Cache service down, falling back to store: {err}");
            match state
                .store
                .list_incidents(state.config.cache.fetch_limit)
                .await
            {
                Ok(incidents) => Json(to_views(incidents)),
                Err(err) => {
                    tracing::error!("Store fallback failed: {err}");
                    Json(Vec::new())
                }
            }
        }
        Err(err) => {
            tracing::error!("Cache service read failed: {err}");
            Json(Vec::new())
        }
    }
}

// -- /api/incidents/search --

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_incidents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<IncidentView>> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Json(Vec::new());
    }

    match state
        .store
        .search(&query, state.config.gateway.search_limit)
        .await
    {
        Ok(incidents) => Json(to_views(incidents)),
        Err(err) => {
            tracing::error!("Search failed: {err}");
            Json(Vec::new())
        }
    }
}

// -- /api/live-updates --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveUpdate {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    incident_id: String,
    message: String,
    timestamp: String,
}

async fn live_updates(State(state): State<Arc<AppState>>) -> Json<Vec<LiveUpdate>> {
    let incidents = match state.store.recent_updates(10).await {
        Ok(incidents) => incidents,
        Err(err) => {
            tracing::error!("Failed to fetch live updates: {err}");
            return Json(Vec::new());
        }
    };

    let updates = incidents
        .iter()
        .filter(|inc| !inc.is_deleted())
        .map(|inc| {
            let status = inc.status();
            let kind = if status == Status::Resolved {
                "resolved"
            } else if status == Status::Investigating {
                "status_change"
            } else if inc.created_at.is_some() && inc.created_at == inc.updated_at {
                "new_incident"
            } else {
                "status_change"
            };

            let id = inc.effective_id();
            LiveUpdate {
                id: format!("update-{id}"),
                kind: kind.to_string(),
                incident_id: id.to_string(),
                message: format!(
                    "{} - {status}",
                    inc.title.as_deref().unwrap_or("Incident")
                ),
                timestamp: inc
                    .updated_at
                    .clone()
                    .or_else(|| inc.created_at.clone())
                    .or_else(|| inc.timestamp.clone())
                    .unwrap_or_default(),
            }
        })
        .collect();

    Json(updates)
}

// -- /api/incidents (POST) --

#[derive(Deserialize)]
struct CreateIncidentRequest {
    title: String,
    description: String,
    severity: Severity,
    status: Status,
    location: String,
}

async fn create_incident(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateIncidentRequest>,
) -> Result<Json<IncidentView>, (StatusCode, Json<ErrorBody>)> {
    let now = chrono::Utc::now();
    let incident_id = ident::generate(now);
    let now_iso = now.to_rfc3339();

    let record = Incident {
        incident_id: Some(incident_id.clone()),
        title: Some(req.title),
        description: Some(req.description),
        severity: Some(req.severity.to_string()),
        status: Some(req.status.to_string()),
        location: Some(req.location),
        organization_id: Some(DEFAULT_ORG_ID.to_string()),
        reporter_id: Some(DEFAULT_REPORTER_ID.to_string()),
        timestamp: Some(now_iso.clone()),
        created_at: Some(now_iso.clone()),
        updated_at: Some(now_iso.clone()),
        ..Default::default()
    };

    let stored = state.store.insert(&record).await.map_err(store_error)?;

    state
        .registry
        .broadcast(&json!({
            "type": "incident_created",
            "incident_id": incident_id,
            "timestamp": now_iso,
        }))
        .await;

    Ok(Json(stored.to_view()))
}

// -- /api/incidents/{id} (PATCH) --

#[derive(Deserialize)]
struct UpdateIncidentRequest {
    title: Option<String>,
    description: Option<String>,
    severity: Option<Severity>,
    status: Option<Status>,
    location: Option<String>,
    assignee_id: Option<String>,
}

async fn update_incident(
    State(state): State<Arc<AppState>>,
    Path(incident_id): Path<String>,
    Json(req): Json<UpdateIncidentRequest>,
) -> Result<Json<IncidentView>, (StatusCode, Json<ErrorBody>)> {
    let now_iso = chrono::Utc::now().to_rfc3339();

    // Only provided fields go to the store; the changed-field list keeps
    // insertion order for the broadcast payload.
    let mut patch = serde_json::Map::new();
    let mut changes: Vec<String> = Vec::new();
    let mut set = |field: &str, value: Value| {
        patch.insert(field.to_string(), value);
        changes.push(field.to_string());
    };

    if let Some(title) = req.title {
        set("title", json!(title));
    }
    if let Some(description) = req.description {
        set("description", json!(description));
    }
    if let Some(severity) = req.severity {
        set("severity", json!(severity));
    }
    if let Some(status) = req.status {
        set("status", json!(status));
        if status == Status::Resolved {
            set("resolved_at", json!(now_iso));
        }
    }
    if let Some(location) = req.location {
        set("location", json!(location));
    }
    if let Some(assignee_id) = req.assignee_id {
        set("assignee_id", json!(assignee_id));
    }
    set("updated_at", json!(now_iso));

    let stored = state
        .store
        .update_by_incident_id(&incident_id, &Value::Object(patch))
        .await
        .map_err(store_error)?;

    state
        .registry
        .broadcast(&json!({
            "type": "incident_updated",
            "incident_id": incident_id,
            "changes": changes,
            "timestamp": now_iso,
        }))
        .await;

    Ok(Json(stored.to_view()))
}

// -- /api/incidents/{id}/soft-delete and DELETE alias --

#[derive(Serialize)]
struct SoftDeleteResponse {
    success: bool,
    incident_id: String,
}

async fn soft_delete_incident(
    State(state): State<Arc<AppState>>,
    Path(incident_id): Path<String>,
) -> Result<Json<SoftDeleteResponse>, (StatusCode, Json<ErrorBody>)> {
    do_soft_delete(&state, incident_id).await
}

/// Alias for soft-delete kept for UI compatibility.
async fn delete_incident(
    State(state): State<Arc<AppState>>,
    Path(incident_id): Path<String>,
) -> Result<Json<SoftDeleteResponse>, (StatusCode, Json<ErrorBody>)> {
    do_soft_delete(&state, incident_id).await
}

async fn do_soft_delete(
    state: &AppState,
    incident_id: String,
) -> Result<Json<SoftDeleteResponse>, (StatusCode, Json<ErrorBody>)> {
    let now_iso = chrono::Utc::now().to_rfc3339();

    let patch = json!({
        "deleted_at": now_iso,
        "updated_at": now_iso,
    });

    state
        .store
        .update_by_incident_id(&incident_id, &patch)
        .await
        .map_err(store_error)?;

    state
        .registry
        .broadcast(&json!({
            "type": "incident_deleted",
            "incident_id": incident_id,
            "timestamp": now_iso,
        }))
        .await;

    Ok(Json(SoftDeleteResponse {
        success: true,
        incident_id,
    }))
}

// -- /api/chat --

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    response: String,
    timestamp: String,
    mode: Option<QueryMode>,
    data_source: Option<String>,
    context_size: Option<usize>,
    incident_refs: Option<Vec<String>>,
}

impl ChatResponse {
    fn plain(response: String) -> Self {
        Self {
            response,
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode: None,
            data_source: None,
            context_size: None,
            incident_refs: None,
        }
    }
}

/// Chat endpoint: greetings are answered locally; everything else is
/// rewritten, wrapped in the prompt template, and proxied to the RAG
/// answer service. Collaborator failures come back as placeholder text
/// with HTTP 200, never as an error status.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    if let Some(greeting) = detect_greeting(&req.message) {
        return Json(ChatResponse {
            mode: Some(QueryMode::Reasoning),
            data_source: Some(DATA_SOURCE.to_string()),
            ..ChatResponse::plain(greeting)
        });
    }

    let enhanced = enhance_query(&req.message);
    let prompt = build_prompt(&enhanced, &req.history, state.config.gateway.history_window);

    let answer = match state.rag.answer(&prompt).await {
        Ok(answer) => answer,
        Err(RagError::Unreachable(err)) => {
            tracing::warn!("Answer service unreachable: {err}");
            return Json(ChatResponse::plain(format!(
                "Error: Cannot connect to the RAG answer service. Is it running at {}?",
                state.config.rag.answer_url
            )));
        }
        Err(err) => {
            tracing::error!("Answer request failed: {err}");
            return Json(ChatResponse::plain(format!("Error: {err}")));
        }
    };

    let analysis = analyze_answer(&answer, &req.message);

    Json(ChatResponse {
        response: answer,
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: Some(detect_query_mode(&req.message)),
        data_source: Some(DATA_SOURCE.to_string()),
        context_size: analysis.context_size,
        incident_refs: if analysis.incident_refs.is_empty() {
            None
        } else {
            Some(analysis.incident_refs)
        },
    })
}
