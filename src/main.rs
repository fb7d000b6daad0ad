use agentic_rag::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Ask(args) => cli::ask::run(&config, args).await,
        Command::Ingest(args) => cli::ingest::run(&config, args).await,
        Command::Serve => cli::serve::run(&config).await,
    }
}
