//! ShopTally - shopping expense tracker CLI
//!
#![doc = "ShopTally - shopping expense tracker CLI"]
#![doc = "Main entry point for the ShopTally application."]

use anyhow::Result;
use colored::Colorize;
use std::rc::Rc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shoptally::cli::Cli;
use shoptally::commands;
use shoptally::config::{Config, LoggingConfig};
use shoptally::error::classify;
use shoptally::storage::SqliteStore;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    if let Err(err) = run(cli).await {
        let app = classify(err);
        tracing::debug!(kind = %app.kind, details = ?app.details, "Command failed");

        eprintln!("{} {}", "Error:".red().bold(), app.message);
        if app.retryable {
            eprintln!("{}", "This may succeed if you try again.".dimmed());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.logging);

    let db_path = config.storage_path()?;
    tracing::debug!("Opening storage at {}", db_path.display());
    let store = Rc::new(SqliteStore::new_with_path(
        db_path,
        Some(config.storage.quota_bytes),
    )?);

    // Execute command
    commands::dispatch(cli.command, store, &config).await
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output on stdout stays clean.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "shoptally={}",
            logging.level.to_ascii_lowercase()
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json_format {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
