mod cli;
mod engine;
mod logging;
mod model;
mod orchestrator;
mod plan;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = !args.is_interactive();

    cli::run(args).await?;
    // Exit explicitly in non-TUI modes; runtime shutdown would otherwise wait on
    // lingering blocking tasks.
    if is_non_tui {
        std::process::exit(0);
    }
    Ok(())
}
