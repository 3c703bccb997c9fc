#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use opsswarm::{Cli, Config, app};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();
    config.validate()?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config
            .observability
            .log_level
            .parse::<Level>()
            .unwrap_or(Level::INFO)
    };

    // Logs go to stderr so `run --json` keeps stdout machine-readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    app::dispatch(cli, config).await
}
