//! SPLM CLI entry point.
//!
//! Parses arguments, runs the selected workflow and renders failures as
//! user-friendly messages with suggestions.

use anyhow::Result;
use clap::Parser;
use splm::cli::Cli;
use splm::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let ctx = user_friendly_error(e);
            ctx.display();
            std::process::exit(1);
        }
    }
}
