//! Background poll loop mirroring the hosted store.
//!
//! Each cycle fetches the full active incident set, fingerprints it, and
//! on change publishes a fresh snapshot and rewrites the artifact
//! directory. Fetch and rewrite failures are confined to their cycle: the
//! previous snapshot stays published and the loop keeps running.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{artifacts, IncidentCache, Snapshot};
use crate::store::StoreClient;

pub struct PollerSettings {
    pub interval: Duration,
    pub fetch_limit: usize,
    pub artifact_dir: PathBuf,
}

/// Run the poll loop. The first fetch happens immediately; subsequent
/// cycles run on the fixed interval. Never returns under normal
/// operation — shutdown is handled by the caller dropping the task.
pub async fn run(
    store: StoreClient,
    cache: IncidentCache,
    settings: PollerSettings,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(settings.interval);
    let mut last_fingerprint = String::new();

    loop {
        ticker.tick().await;

        let incidents = match store.list_incidents(settings.fetch_limit).await {
            Ok(incidents) => incidents,
            Err(err) => {
                tracing::error!("Poll cycle failed, keeping previous snapshot: {err}");
                continue;
            }
        };

        let snapshot = Snapshot::new(incidents);
        if snapshot.fingerprint == last_fingerprint {
            continue;
        }

        tracing::info!(
            "Incident set changed: {} incidents fetched",
            snapshot.incidents.len()
        );

        let fingerprint = snapshot.fingerprint.clone();
        let incidents = snapshot.incidents.clone();
        cache.publish(snapshot).await;

        // Fingerprint advances only after a successful rewrite so a failed
        // write is retried on the next cycle even if the data is unchanged.
        match artifacts::rewrite(&settings.artifact_dir, &incidents) {
            Ok(stats) => {
                tracing::info!(
                    "Wrote {} incident artifacts to {}",
                    stats.written,
                    settings.artifact_dir.display()
                );
                last_fingerprint = fingerprint;
            }
            Err(err) => {
                tracing::error!("Artifact rewrite failed: {err:#}");
            }
        }
    }
}
