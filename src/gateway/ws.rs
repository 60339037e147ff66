//! WebSocket endpoints and the connection registry.
//!
//! Clients connect on `/ws/incidents` (or the legacy `/ws/updates` alias)
//! and receive `incident_created` / `incident_updated` /
//! `incident_deleted` events whenever a write goes through the gateway.
//! Inbound client messages are echoed back as acks; there are no other
//! inbound semantics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};

use super::AppState;

/// Registry of live WebSocket clients.
///
/// Each connection gets an unbounded channel; the socket task drains it.
/// Broadcast snapshots the channel list, attempts delivery to every entry,
/// and prunes failures only after the pass completes, so one dead client
/// never skips delivery to a later one.
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: Mutex<Vec<(u64, mpsc::UnboundedSender<String>)>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connections: Mutex::new(Vec::new()),
        }
    }

    /// Register a new connection, returning its id and the event receiver.
    pub async fn register(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.lock().await.push((id, tx));
        (id, rx)
    }

    /// Remove a connection on disconnect.
    pub async fn unregister(&self, id: u64) {
        self.connections.lock().await.retain(|(cid, _)| *cid != id);
    }

    /// Deliver an event to every registered connection.
    pub async fn broadcast(&self, event: &serde_json::Value) {
        let payload = event.to_string();
        let snapshot = self.connections.lock().await.clone();

        let mut failed = Vec::new();
        for (id, tx) in &snapshot {
            if tx.send(payload.clone()).is_err() {
                failed.push(*id);
            }
        }

        if !failed.is_empty() {
            self.connections
                .lock()
                .await
                .retain(|(id, _)| !failed.contains(id));
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `GET /ws/incidents` — real-time incident change events.
pub(super) async fn ws_incidents(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// `GET /ws/updates` — legacy alias for `/ws/incidents`.
pub(super) async fn ws_updates(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let registry = &state.registry;
    let (id, mut events) = registry.register().await;
    let (mut sink, mut stream) = socket.split();

    let connected = serde_json::json!({
        "type": "connected",
        "message": "Connected to incident updates",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if sink
        .send(Message::Text(connected.to_string().into()))
        .await
        .is_err()
    {
        registry.unregister(id).await;
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(payload) = event else { break };
                if sink.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let ack = serde_json::json!({
                            "type": "ack",
                            "message": text.as_str(),
                            "timestamp": chrono::Utc::now().to_rfc3339(),
                        });
                        if sink.send(Message::Text(ack.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Pings are answered by axum; other frames carry no semantics.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    registry.unregister(id).await;
    tracing::debug!("WebSocket client {id} disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connection_count(registry: &ConnectionRegistry) -> usize {
        registry.connections.lock().await.len()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_connections() {
        let registry = ConnectionRegistry::new();
        let (_id1, mut rx1) = registry.register().await;
        let (_id2, mut rx2) = registry.register().await;

        registry
            .broadcast(&serde_json::json!({"type": "incident_created"}))
            .await;

        assert!(rx1.recv().await.unwrap().contains("incident_created"));
        assert!(rx2.recv().await.unwrap().contains("incident_created"));
    }

    #[tokio::test]
    async fn test_failed_connection_pruned_after_full_pass() {
        let registry = ConnectionRegistry::new();
        let (_id1, mut rx1) = registry.register().await;
        let (_id2, rx2) = registry.register().await;
        let (_id3, mut rx3) = registry.register().await;

        // Middle connection dies before the broadcast.
        drop(rx2);
        assert_eq!(connection_count(&registry).await, 3);

        registry
            .broadcast(&serde_json::json!({"type": "incident_updated"}))
            .await;

        // Connections after the failed one still got the message in the
        // same pass, and the dead one is gone afterwards.
        assert!(rx1.recv().await.unwrap().contains("incident_updated"));
        assert!(rx3.recv().await.unwrap().contains("incident_updated"));
        assert_eq!(connection_count(&registry).await, 2);
    }

    #[tokio::test]
    async fn test_unregister_removes_connection() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = registry.register().await;
        assert_eq!(connection_count(&registry).await, 1);
        registry.unregister(id).await;
        assert_eq!(connection_count(&registry).await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_registry_is_noop() {
        let registry = ConnectionRegistry::new();
        registry
            .broadcast(&serde_json::json!({"type": "incident_deleted"}))
            .await;
        assert_eq!(connection_count(&registry).await, 0);
    }
}
