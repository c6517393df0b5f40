//! podstudio CLI - build a signal chain from the command line and play it.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "podstudio")]
#[command(author, version, about = "Podcast studio signal chains", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered effects, or show one
    Effects(commands::effects::EffectsArgs),

    /// List output devices
    Devices,

    /// Play a file through a chain of effects
    Play(commands::play::PlayArgs),

    /// Resolve and compile a chain without streaming
    Check(commands::chain::ChainArgs),
}

/// Install the stderr subscriber and route `log` records (cpal's) into it.
///
/// `RUST_LOG` wins over `fallback_filter`. Fails if a logger or subscriber
/// is already installed.
fn init_tracing(fallback_filter: &str) -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::common::load_config(cli.config.as_deref())?;

    init_tracing(&config.logging.filter)?;

    match cli.command {
        Commands::Effects(args) => commands::effects::run(&args, &config),
        Commands::Devices => commands::devices::run(&config),
        Commands::Play(args) => commands::play::run(args, &config),
        Commands::Check(args) => commands::chain::check(&args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_installs_once() {
        init_tracing("info").unwrap();
        assert!(init_tracing("info").is_err());
    }
}
