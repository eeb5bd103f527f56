//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `url_expander` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use url_expander::initialization::init_logger_with;
use url_expander::{run_pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let db_path = config.db_path.clone();
    match run_pipeline(config).await {
        Ok(report) => {
            println!(
                "✅ Processed {} item{} ({} acked, {} failed; {} media, {} indexed) in {:.1}s",
                report.total_items,
                if report.total_items == 1 { "" } else { "s" },
                report.acked,
                report.failed,
                report.media,
                report.indexed,
                report.elapsed_seconds
            );
            println!("Status records saved in {}", db_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("url_expander error: {:#}", e);
            process::exit(1);
        }
    }
}
