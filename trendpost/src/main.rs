/*
trendpost - single-binary daily bot main.rs
This binary runs one collect -> generate -> deliver pass and exits; a
scheduler (cron, CI timer) is expected to invoke it once a day.
*/

use anyhow::Result;
use clap::Parser;
use common::{Config, Secrets};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use trendpost::pipeline::{self, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "trendpost", about = "Daily frontend-trends post bot for Telegram")]
struct Args {
    /// Path to config.toml (optional; the built-in defaults cover a full run)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A .env file is honored for local runs; the scheduler's environment wins.
    dotenv::dotenv().ok();

    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref()
    ).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    // Secrets come from the environment only. A missing one ends the run
    // right here, before any network call, with a log-only diagnostic.
    let secrets = match Secrets::from_env(&config) {
        Ok(secrets) => secrets,
        Err(e) => {
            error!(%e, "missing configuration; aborting run");
            return Ok(());
        }
    };

    info!("starting daily trend post run");
    match pipeline::run_once(&config, &secrets).await {
        RunOutcome::Posted => info!("run finished: post delivered"),
        RunOutcome::NoNews => info!("run finished: no news to post"),
        RunOutcome::GenerationFailed => info!("run finished: no post produced"),
        RunOutcome::DeliveryFailed => info!("run finished: delivery failed"),
    }

    Ok(())
}
