use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for Beacon
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub rag: RagConfig,
    pub cache: CacheConfig,
    pub gateway: GatewayConfig,
}

/// Configuration for the hosted incident store (PostgREST-style API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the hosted store (e.g. "https://xyz.supabase.co")
    pub url: String,
    /// API key — literal value or "env:VAR_NAME" to read from environment
    pub key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: "env:BEACON_STORE_KEY".into(),
            timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    /// Resolve the store URL, letting `BEACON_STORE_URL` override the file.
    pub fn resolve_url(&self) -> String {
        std::env::var("BEACON_STORE_URL").unwrap_or_else(|_| self.url.clone())
    }

    /// Resolve the API key, supporting "env:VAR_NAME" syntax
    pub fn resolve_key(&self) -> Option<String> {
        if let Some(var_name) = self.key.strip_prefix("env:") {
            std::env::var(var_name).ok()
        } else if self.key.is_empty() {
            None
        } else {
            Some(self.key.clone())
        }
    }
}

/// Configuration for the external RAG answer service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Base URL of the answer service
    pub answer_url: String,
    /// Answer request timeout in seconds. Generous: upstream inference is
    /// the one call in this system expected to block noticeably.
    pub timeout_secs: u64,
    /// Health probe timeout in seconds
    pub probe_timeout_secs: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            answer_url: "http://localhost:8081".into(),
            timeout_secs: 120,
            probe_timeout_secs: 2,
        }
    }
}

/// Configuration for the incident cache poller and query service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// URL the gateway uses to reach the cache query service
    pub service_url: String,
    /// Bind address for the cache query service
    pub bind: String,
    /// Store polling interval in seconds
    pub poll_interval_secs: u64,
    /// Directory the poller writes incident text artifacts into. Empty
    /// means the per-user cache directory. Owned exclusively by the
    /// poller; no other writer may touch it.
    pub artifact_dir: String,
    /// Upper bound on incidents fetched per poll cycle
    pub fetch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8082".into(),
            bind: "0.0.0.0:8082".into(),
            poll_interval_secs: 5,
            artifact_dir: String::new(),
            fetch_limit: 1000,
        }
    }
}

impl CacheConfig {
    /// Resolve the artifact directory, defaulting to the user cache dir.
    pub fn resolve_artifact_dir(&self) -> Result<PathBuf> {
        if !self.artifact_dir.is_empty() {
            return Ok(PathBuf::from(&self.artifact_dir));
        }
        let project_dirs = directories::ProjectDirs::from("dev", "beacon", "beacon")
            .context("Failed to determine user directories")?;
        Ok(project_dirs.cache_dir().join("incidents"))
    }
}

/// Configuration for the API gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address for the gateway
    pub bind: String,
    /// Maximum results returned by incident search
    pub search_limit: usize,
    /// How many history entries feed the chat prompt (6 = 3 turns)
    pub history_window: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".into(),
            search_limit: 50,
            history_window: 6,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Get the config file path for a working directory
    pub fn config_path(root: &Path) -> PathBuf {
        root.join("beacon.toml")
    }
}
