use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite existing configuration
    #[arg(long)]
    force: bool,
}

#[derive(Serialize)]
struct InitOutput {
    status: String,
    config: String,
}

pub fn run(args: InitArgs, output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let config_path = Config::config_path(&root);

    if config_path.exists() && !args.force {
        if output.json {
            let json_output = InitOutput {
                status: "already_initialized".to_string(),
                config: config_path.display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        } else {
            bail!(
                "Beacon already initialized at {}. Use --force to overwrite.",
                config_path.display()
            );
        }
        return Ok(());
    }

    let config = Config::default();
    config.save(&config_path)?;

    if output.json {
        let json_output = InitOutput {
            status: "initialized".to_string(),
            config: config_path.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!(
            "{} Beacon config written to {}",
            "+".green(),
            config_path.display()
        );
        println!("\nNext steps:");
        println!("  1. Set the store URL and key in beacon.toml (or BEACON_STORE_URL / BEACON_STORE_KEY)");
        println!("  2. {} to start the cache poller", "beacon cache".cyan());
        println!("  3. {} to start the gateway", "beacon serve".cyan());
    }

    Ok(())
}
