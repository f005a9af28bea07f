//! ## splitlog-cli
//! Emits one leveled entry through a configured routing logger.

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    splitlog_telemetry::init_diagnostics();
    let cli = Cli::parse();
    commands::run_command(cli)?;
    Ok(())
}
