//! `export-seal` binary entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise structured logging on stderr.
//! 4. Run the requested transform and print a summary on stdout.

mod app;
mod cli;
mod config;
mod paths;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::config::Config;

fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = cli::Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::from(2);
        }
    };

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    let level = if cli.verbose { "debug" } else { cfg.log_level.as_str() };
    if let Err(e) = telemetry::init(level, cli.json_logs || cfg.log_format == "json") {
        eprintln!("ERROR: {e:#}");
        return ExitCode::from(2);
    }

    // -----------------------------------------------------------------------
    // 4. Run
    // -----------------------------------------------------------------------
    let opts = app::RunOptions::new(&cli, &cfg);
    match app::run(&opts) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("ERROR: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
