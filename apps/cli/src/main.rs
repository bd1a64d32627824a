//! MeetBrief CLI — meeting preparation briefings from the terminal.
//!
//! Collects participants, context, and objective, runs the 4-stage
//! briefing pipeline, and prints or exports the result.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
