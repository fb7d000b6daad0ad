//! `ingest` command - loads files into the routed store

use std::path::PathBuf;

use clap::Args;
use tracing::error;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Files to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Source name recorded on every chunk; defaults to the file name
    #[arg(long)]
    pub source: Option<String>,
}

/// Ingest each file in order; failures are reported and the rest continue
pub async fn run(config: &crate::AppConfig, args: IngestArgs) -> anyhow::Result<()> {
    if args.source.is_some() && args.paths.len() > 1 {
        anyhow::bail!("--source can only be used with a single path");
    }

    let state = crate::create_app_state(config)?;
    let mut failed = 0usize;

    for path in &args.paths {
        match state
            .ingestion
            .ingest_file(path, args.source.as_deref())
            .await
        {
            Ok(report) => println!(
                "{}: {} chunks -> store {} ({})",
                report.source, report.chunks, report.store, report.domain
            ),
            Err(e) => {
                failed += 1;
                error!(path = %path.display(), kind = e.kind(), error = %e, "Ingestion failed");
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files failed to ingest", failed, args.paths.len());
    }

    Ok(())
}
