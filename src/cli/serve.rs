use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct ServeArgs {
    /// Override the gateway bind address from the config file
    #[arg(long)]
    bind: Option<String>,
}

pub async fn run(args: ServeArgs, mut config: Config, output: OutputConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.gateway.bind = bind;
    }

    if !output.quiet {
        println!("{} Beacon gateway on {}", "~".cyan(), config.gateway.bind);
        println!("  Store:         {}", display_or_unset(&config.store.resolve_url()));
        println!("  Cache service: {}", config.cache.service_url);
        println!("  Answer service: {}", config.rag.answer_url);
        println!("  Press Ctrl+C to stop");
    }

    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        result = crate::gateway::run_server(config) => result,

        _ = tokio::signal::ctrl_c() => {
            if !output.quiet {
                println!("\n{} Stopping gateway", "~".cyan());
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

fn display_or_unset(url: &str) -> &str {
    if url.is_empty() {
        "(not configured)"
    } else {
        url
    }
}
