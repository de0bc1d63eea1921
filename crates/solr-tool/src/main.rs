//! Solr command-line tool
//!
//! Runs term scans, searches, field analysis and bulk loads against a
//! standalone Solr node or a SolrCloud cluster.

mod commands;
mod config;

use clap::Parser;
use tracing::info;

use crate::config::ToolConfig;

/// Initializes logging to stderr, leaving stdout to command output.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_solr={},helios_solr_tool={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ToolConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        command = config.command.name(),
        urls = %config.urls,
        collection = ?config.collection,
        cloud = config.cloud,
        "Running solr-tool"
    );

    let mut stdout = std::io::stdout().lock();
    commands::run(&config, &mut stdout).await
}
