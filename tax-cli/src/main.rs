use anyhow::Result;
use clap::Parser;
use tracing::debug;

use tax_cli::cli::{Cli, Command};
use tax_cli::{commands, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level, cli.log_file.as_deref())?;
    debug!(?cli, "starting");

    let output = match &cli.command {
        Command::Compute(args) => commands::run_compute(args)?,
        Command::Policy(args) => commands::run_policy(args)?,
    };
    println!("{output}");

    Ok(())
}
