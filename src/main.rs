// Marketplace service entry point
// Each subcommand runs one service in its own process

use anyhow::Result;
use clap::Parser;
use marketplace::{cli, observability};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    if cli.command.is_service() {
        observability::init()?;
    }

    cli::commands::execute(cli.command).await
}
