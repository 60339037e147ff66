use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::OutputConfig;
use crate::cache::poller::{self, PollerSettings};
use crate::cache::{server, IncidentCache};
use crate::config::Config;
use crate::store::StoreClient;

#[derive(Args)]
pub struct CacheArgs {
    /// Override the query service bind address from the config file
    #[arg(long)]
    bind: Option<String>,

    /// Override the poll interval in seconds
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Override the artifact directory
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
}

pub async fn run(args: CacheArgs, mut config: Config, output: OutputConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.cache.bind = bind;
    }
    if let Some(interval) = args.poll_interval {
        config.cache.poll_interval_secs = interval;
    }

    let artifact_dir = match args.artifact_dir {
        Some(dir) => dir,
        None => config.cache.resolve_artifact_dir()?,
    };

    let store = StoreClient::new(
        &config.store.resolve_url(),
        &config.store.resolve_key().unwrap_or_default(),
        Duration::from_secs(config.store.timeout_secs),
    )?;
    let cache = IncidentCache::new();

    if !output.quiet {
        println!("{} Beacon cache service on {}", "~".cyan(), config.cache.bind);
        println!("  Artifacts:     {}", artifact_dir.display());
        println!("  Poll interval: {}s", config.cache.poll_interval_secs);
        println!("  Press Ctrl+C to stop");
    }

    let settings = PollerSettings {
        interval: Duration::from_secs(config.cache.poll_interval_secs),
        fetch_limit: config.cache.fetch_limit,
        artifact_dir,
    };

    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        result = server::run_server(cache.clone(), &config.cache.bind) => result,

        result = poller::run(store, cache.clone(), settings) => result,

        _ = tokio::signal::ctrl_c() => {
            if !output.quiet {
                println!("\n{} Stopping cache service", "~".cyan());
            }
            Ok(())
        }

        _ = sigterm.recv() => {
            if !output.quiet {
                println!("\n{} Received SIGTERM, stopping", "~".cyan());
            }
            Ok(())
        }
    }
}
