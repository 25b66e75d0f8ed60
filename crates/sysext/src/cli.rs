//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use sysext_core::Operation;

/// Sysext - activate, replace or remove a system extension
#[derive(Parser, Debug)]
#[command(name = "sysext")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an extra config file layered over ~/.sysext/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Print lifecycle events as JSON lines on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Extension bundle identifier (overrides config)
    #[arg(long, global = true)]
    pub identifier: Option<String>,

    /// Candidate bundle version (overrides config)
    #[arg(long, global = true)]
    pub bundle_version: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Install the extension, replacing an older build
    Activate,

    /// Install the extension, replacing any different build
    #[command(name = "forceActivate", alias = "force-activate")]
    ForceActivate,

    /// Uninstall the extension
    Deactivate,
}

impl Commands {
    pub fn operation(self) -> Operation {
        match self {
            Commands::Activate => Operation::Activate,
            Commands::ForceActivate => Operation::ForceActivate,
            Commands::Deactivate => Operation::Deactivate,
        }
    }
}

/// What `main` should do with the parsed command line
#[derive(Debug)]
pub enum Invocation {
    /// Perform the lifecycle command
    Run(Cli, Commands),
    /// No known subcommand: print usage and exit successfully
    Usage,
    /// Help, version or a malformed flag: let clap report it and exit
    Exit(clap::Error),
}

impl Invocation {
    pub fn from_parse(result: Result<Cli, clap::Error>) -> Self {
        match result {
            Ok(cli) => match cli.command {
                Some(command) => Invocation::Run(cli, command),
                None => Invocation::Usage,
            },
            Err(e) if e.kind() == ErrorKind::InvalidSubcommand => Invocation::Usage,
            Err(e) => Invocation::Exit(e),
        }
    }
}

/// Print the short usage shown when no known subcommand is given
pub fn print_usage() {
    println!("Usage:");
    println!("    sysext activate|forceActivate|deactivate");
    println!();
    println!("Run `sysext --help` for options.");
}
