//! Command-line interface for logbook.
//!
//! This module provides the CLI structure for the `logbook` binary. Command
//! handlers live in the binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ExportCommand, RenderMapCommand};

/// logbook - Print your flight log as an EASA logbook
///
/// Reads flights from an Excel workbook or a Google spreadsheet and writes a
/// paginated PDF logbook with running totals, or a PNG map of the airports
/// and routes flown.
#[derive(Debug, Parser)]
#[command(name = "logbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
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
    /// Export the flights as a PDF logbook
    Export(ExportCommand),

    /// Render airports and routes flown as a PNG map
    RenderMap(RenderMapCommand),

    /// View or create configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print the version
    Version,
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
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
