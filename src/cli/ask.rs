//! `ask` command - runs one workflow and prints the answer

use anyhow::Context;
use clap::Args;

use crate::api::types::AskResponse;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Question to answer
    pub query: String,

    /// Print the full response, including retrieval rounds, as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(config: &crate::AppConfig, args: AskArgs) -> anyhow::Result<()> {
    let state = crate::create_app_state(config)?;

    let workflow = state
        .orchestrator
        .run(&args.query)
        .await
        .context("workflow aborted")?;
    let response = AskResponse::from_state(&workflow);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", response.answer);

    if !response.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &response.sources {
            println!("  - {}", source);
        }
    }

    if response.cap_reached {
        eprintln!(
            "note: stopped refining after {} rounds; answer uses the evidence gathered so far",
            response.rounds.len()
        );
    }

    Ok(())
}
