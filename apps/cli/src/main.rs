//! Graphloom CLI: incremental knowledge-graph import tool.
//!
//! Converts a tree of structured text documents into typed content nodes
//! and an incrementally-updatable knowledge graph.

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
