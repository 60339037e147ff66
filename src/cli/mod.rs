mod cache;
mod completions;
mod init;
mod serve;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Incident intelligence gateway: CRUD proxy, RAG cache, and chat routing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ./beacon.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show detailed progress
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default beacon.toml config file
    Init(init::InitArgs),

    /// Run the API gateway (HTTP + WebSocket front door)
    Serve(serve::ServeArgs),

    /// Run the incident cache poller and query service
    Cache(cache::CacheArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let output = OutputConfig {
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
        };

        match self.command {
            Commands::Init(args) => init::run(args, output),
            Commands::Serve(args) => {
                let config = load_config(self.config.as_deref(), output)?;
                serve::run(args, config, output).await
            }
            Commands::Cache(args) => {
                let config = load_config(self.config.as_deref(), output)?;
                cache::run(args, config, output).await
            }
            Commands::Completions(args) => {
                completions::run(args);
                Ok(())
            }
        }
    }
}

/// Output configuration passed to all commands
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
}

/// Load the config file, falling back to built-in defaults when no file
/// exists and none was requested explicitly.
fn load_config(path: Option<&Path>, output: OutputConfig) -> Result<Config> {
    match path {
        Some(path) => {
            if output.verbose && !output.quiet {
                println!("  Using config: {}", path.display());
            }
            Config::load(path)
        }
        None => {
            let default = Config::config_path(Path::new("."));
            if default.exists() {
                if output.verbose && !output.quiet {
                    println!("  Using config: {}", default.display());
                }
                Config::load(&default)
            } else {
                tracing::info!("No beacon.toml found, using built-in defaults");
                Ok(Config::default())
            }
        }
    }
}
