//! Command-line surface
//!
//! - `ask`: answer one question and exit
//! - `ingest`: load files into the store their domain routes to
//! - `serve`: run the HTTP API

pub mod ask;
pub mod ingest;
pub mod serve;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Domain-routed retrieval with a validation loop and cited answers
#[derive(Parser)]
#[command(name = "agentic-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a question from the configured stores
    Ask(ask::AskArgs),

    /// Ingest documents (.txt, .md, .pdf, .docx)
    Ingest(ingest::IngestArgs),

    /// Run the HTTP API
    Serve,
}

/// Load `.env` and configuration, then start logging
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(path.map(PathBuf::as_path))
        .context("failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}
