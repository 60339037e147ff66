//! On-disk incident artifacts for the RAG pipeline.
//!
//! One UTF-8 text file per valid incident, in a fixed human-readable
//! layout the answer pipeline ingests. The directory is fully rewritten
//! whenever the cache changes: stale files are purged first so the
//! artifact set always mirrors the current snapshot exactly.

use std::path::Path;

use anyhow::{Context, Result};

use crate::ident;
use crate::types::Incident;

/// Counters from one artifact rewrite pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub written: usize,
    pub skipped_legacy: usize,
}

/// Render an incident in the fixed artifact layout.
pub fn render_incident(incident: &Incident) -> String {
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
    format!(
        "Incident ID: {}\n\
         Title: {}\n\
         Status: {}\n\
         Severity: {}\n\
         Location: {}\n\
         Description: {}\n\
         Timestamp: {}\n\
         ---",
        incident.effective_id(),
        field(&incident.title),
        field(&incident.status),
        field(&incident.severity),
        field(&incident.location),
        field(&incident.description),
        field(&incident.timestamp),
    )
}

/// Rewrite the artifact directory from the given incident set.
///
/// Stale `.txt` files are removed first. Incidents with a legacy numeric
/// identifier are counted and skipped — they stay invisible to the RAG
/// pipeline until migrated. An empty set leaves a single placeholder file
/// so the pipeline always has something to ingest.
pub fn rewrite(dir: &Path, incidents: &[Incident]) -> Result<RewriteStats> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create artifact dir: {}", dir.display()))?;

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read artifact dir: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale artifact: {}", path.display()))?;
        }
    }

    if incidents.is_empty() {
        std::fs::write(
            dir.join("placeholder.txt"),
            "No incidents loaded yet. Waiting for data from the store.",
        )
        .context("Failed to write placeholder artifact")?;
        return Ok(RewriteStats::default());
    }

    let mut stats = RewriteStats::default();
    for incident in incidents {
        let id = incident.effective_id();

        if ident::is_legacy(id) {
            tracing::warn!("Legacy incident id {id} excluded from cache artifacts");
            stats.skipped_legacy += 1;
            continue;
        }
        if !ident::is_canonical(id) {
            // Row ids and placeholders are still written (only the legacy
            // numeric form is quarantined) but they are data anomalies.
            tracing::warn!("Non-canonical incident id {id} in cache input");
        }

        let path = dir.join(format!("{id}.txt"));
        std::fs::write(&path, render_incident(incident))
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
        stats.written += 1;
    }

    if stats.skipped_legacy > 0 {
        tracing::error!(
            "Skipped {} incidents with legacy ids; they need migration",
            stats.skipped_legacy
        );
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: &str) -> Incident {
        Incident {
            incident_id: Some(id.to_string()),
            title: Some("Core switch down".to_string()),
            description: Some("Unreachable since 09:00".to_string()),
            severity: Some("critical".to_string()),
            status: Some("investigating".to_string()),
            location: Some("Block B".to_string()),
            timestamp: Some("2025-01-01T09:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_fixed_layout() {
        let text = render_incident(&incident("INC-20250101-090000"));
        assert_eq!(
            text,
            "Incident ID: INC-20250101-090000\n\
             Title: Core switch down\n\
             Status: investigating\n\
             Severity: critical\n\
             Location: Block B\n\
             Description: Unreachable since 09:00\n\
             Timestamp: 2025-01-01T09:00:00Z\n\
             ---"
        );
    }

    #[test]
    fn test_render_missing_fields_use_na() {
        let inc = Incident {
            incident_id: Some("INC-20250101-090000".to_string()),
            ..Default::default()
        };
        let text = render_incident(&inc);
        assert!(text.contains("Title: N/A"));
        assert!(text.contains("Description: N/A"));
    }

    #[test]
    fn test_rewrite_excludes_legacy_ids() {
        let dir = tempfile::tempdir().unwrap();
        let stats = rewrite(
            dir.path(),
            &[incident("INC-20250101-090000"), incident("INC-123")],
        )
        .unwrap();

        assert_eq!(stats.written, 1);
        assert_eq!(stats.skipped_legacy, 1);
        assert!(dir.path().join("INC-20250101-090000.txt").exists());
        assert!(!dir.path().join("INC-123.txt").exists());
    }

    #[test]
    fn test_rewrite_purges_stale_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        rewrite(dir.path(), &[incident("INC-20250101-090000")]).unwrap();
        rewrite(dir.path(), &[incident("INC-20250202-100000")]).unwrap();

        assert!(!dir.path().join("INC-20250101-090000.txt").exists());
        assert!(dir.path().join("INC-20250202-100000.txt").exists());
    }

    #[test]
    fn test_rewrite_empty_set_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        rewrite(dir.path(), &[incident("INC-20250101-090000")]).unwrap();
        let stats = rewrite(dir.path(), &[]).unwrap();

        assert_eq!(stats, RewriteStats::default());
        assert!(!dir.path().join("INC-20250101-090000.txt").exists());
        assert!(dir.path().join("placeholder.txt").exists());
    }

    #[test]
    fn test_artifact_content_matches_rendered_fields() {
        let dir = tempfile::tempdir().unwrap();
        let inc = incident("INC-20250101-090000");
        rewrite(dir.path(), std::slice::from_ref(&inc)).unwrap();

        let written =
            std::fs::read_to_string(dir.path().join("INC-20250101-090000.txt")).unwrap();
        assert_eq!(written, render_incident(&inc));
    }
}
