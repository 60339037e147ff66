//! Incident cache: the poller that mirrors the hosted store into process
//! memory and an artifact directory, and the query service that serves the
//! mirror.
//!
//! The cache is a single-writer/many-reader snapshot. The poller is the
//! only writer; it publishes a whole new [`Snapshot`] behind an `Arc` so
//! readers never observe a partially written incident set.

pub mod artifacts;
pub mod client;
pub mod poller;
pub mod server;

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::types::Incident;

/// An immutable view of the incident set at one poll cycle.
#[derive(Debug)]
pub struct Snapshot {
    pub incidents: Vec<Incident>,
    /// Content fingerprint used to detect no-op poll cycles.
    pub fingerprint: String,
}

impl Snapshot {
    /// Build a snapshot from a fetched incident set. Soft-deleted rows are
    /// dropped here even though the store query already excludes them, so
    /// the invariant does not depend on the remote filter.
    pub fn new(mut incidents: Vec<Incident>) -> Self {
        incidents.retain(|inc| !inc.is_deleted());
        let fingerprint = fingerprint(&incidents);
        Self {
            incidents,
            fingerprint,
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Deterministic content fingerprint over an incident set.
///
/// Each incident is serialized on its own and the serializations are
/// sorted before hashing, so the fingerprint is invariant under element
/// reordering and changes exactly when the semantic content changes.
pub fn fingerprint(incidents: &[Incident]) -> String {
    let mut rows: Vec<String> = incidents
        .iter()
        .map(|inc| serde_json::to_string(inc).unwrap_or_default())
        .collect();
    rows.sort_unstable();

    let mut hasher = Sha256::new();
    for row in &rows {
        hasher.update(row.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Shared handle to the latest snapshot.
///
/// Writes swap the inner `Arc`; reads clone it. The lock is held only for
/// the pointer operation, never across I/O.
#[derive(Clone)]
pub struct IncidentCache {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl IncidentCache {
    /// Create a cache holding an empty snapshot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(Snapshot::empty()))),
        }
    }

    /// Atomically publish a new snapshot.
    pub async fn publish(&self, snapshot: Snapshot) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(snapshot);
    }

    /// Get the current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.read().await.clone()
    }
}

impl Default for IncidentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str, title: &str) -> Incident {
        Incident {
            incident_id: Some(id.to_string()),
            title: Some(title.to_string()),
            severity: Some("medium".to_string()),
            status: Some("open".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fingerprint_invariant_under_reordering() {
        let a = incident("INC-20250101-120000", "one");
        let b = incident("INC-20250102-130000", "two");
        let c = incident("INC-20250103-140000", "three");

        let forward = fingerprint(&[a.clone(), b.clone(), c.clone()]);
        let reversed = fingerprint(&[c, b, a]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = incident("INC-20250101-120000", "one");
        let mut a2 = a.clone();
        a2.title = Some("one, edited".to_string());

        assert_ne!(fingerprint(&[a.clone()]), fingerprint(&[a2]));
        assert_ne!(
            fingerprint(&[a.clone()]),
            fingerprint(&[a, incident("INC-20250102-130000", "two")])
        );
    }

    #[test]
    fn test_fingerprint_empty_set_is_stable() {
        assert_eq!(fingerprint(&[]), fingerprint(&[]));
    }

    #[test]
    fn test_snapshot_drops_soft_deleted() {
        let mut deleted = incident("INC-20250101-120000", "gone");
        deleted.deleted_at = Some("2025-01-02T00:00:00Z".to_string());
        let kept = incident("INC-20250102-130000", "kept");

        let snap = Snapshot::new(vec![deleted, kept]);
        assert_eq!(snap.incidents.len(), 1);
        assert_eq!(snap.incidents[0].effective_id(), "INC-20250102-130000");
    }

    #[tokio::test]
    async fn test_cache_publish_and_read() {
        let cache = IncidentCache::new();
        assert!(cache.snapshot().await.incidents.is_empty());

        let snap = Snapshot::new(vec![incident("INC-20250101-120000", "one")]);
        let fp = snap.fingerprint.clone();
        cache.publish(snap).await;

        let current = cache.snapshot().await;
        assert_eq!(current.incidents.len(), 1);
        assert_eq!(current.fingerprint, fp);
    }

    #[tokio::test]
    async fn test_readers_keep_old_snapshot_across_publish() {
        let cache = IncidentCache::new();
        cache
            .publish(Snapshot::new(vec![incident("INC-20250101-120000", "one")]))
            .await;

        let held = cache.snapshot().await;
        cache.publish(Snapshot::new(Vec::new())).await;

        // The reader's Arc still sees the snapshot it took.
        assert_eq!(held.incidents.len(), 1);
        assert!(cache.snapshot().await.incidents.is_empty());
    }
}
