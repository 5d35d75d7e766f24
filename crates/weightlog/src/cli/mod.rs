//! Command-line interface for weightlog.
//!
//! This module provides the CLI structure for the `weightlog` binary. Each
//! invocation mounts an entry form over the configured store, applies one
//! action and prints the result.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, ImportCommand, ListCommand, NameCommand,
    StatusCommand,
};

/// weightlog - Track your weight, one entry every 48 hours
#[derive(Debug, Parser)]
#[command(name = "weightlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a weight
    Add(AddCommand),

    /// Show the weight history
    List(ListCommand),

    /// Show whether a new weight can be recorded
    Status(StatusCommand),

    /// Delete every recorded weight
    Clear(ClearCommand),

    /// Set the name used for the next entries
    Name(NameCommand),

    /// Print the ledger as JSON
    Export,

    /// Replace the ledger with entries from a JSON file
    Import(ImportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Info,
                2 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// The file `config validate` should check, or `None` for other commands.
    ///
    /// `--file` wins over `-c`; without either, the default config path is used.
    #[must_use]
    pub fn validation_target(&self) -> Option<PathBuf> {
        match &self.command {
            Command::Config(ConfigCommand::Validate { file }) => Some(
                file.clone()
                    .or_else(|| self.config.clone())
                    .unwrap_or_else(crate::config::Config::default_config_path),
            ),
            _ => None,
        }
    }
}
