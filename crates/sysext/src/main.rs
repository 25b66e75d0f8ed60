//! Sysext CLI - system extension lifecycle manager
//!
//! This is the main entry point for the sysext command-line interface.

mod cli;
mod commands;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Invocation};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI args
    let (cli, command) = match Invocation::from_parse(Cli::try_parse()) {
        Invocation::Run(cli, command) => (cli, command),
        Invocation::Usage => {
            cli::print_usage();
            return ExitCode::SUCCESS;
        }
        Invocation::Exit(e) => e.exit(),
    };

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    let args = commands::lifecycle::LifecycleArgs {
        operation: command.operation(),
        config: cli.config,
        identifier: cli.identifier,
        bundle_version: cli.bundle_version,
        json: cli.json,
    };

    match commands::lifecycle::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
