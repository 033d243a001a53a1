//! CLI command definitions.
//!
//! Flags given on the command line override the loaded configuration through
//! the `apply` methods.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{LogbookConfig, MapConfig};

/// Export command arguments.
#[derive(Debug, Default, Args)]
pub struct ExportCommand {
    /// Output PDF file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the last sheet row first
    #[arg(long, conflicts_with = "chronological")]
    pub reverse: bool,

    /// Write rows in sheet order
    #[arg(long)]
    pub chronological: bool,

    /// Name printed in the certification block
    #[arg(long)]
    pub owner: Option<String>,

    /// Start a new logbook after this page (repeatable)
    #[arg(long = "page-break", value_name = "PAGE")]
    pub page_breaks: Vec<u32>,
}

impl ExportCommand {
    /// Overlay the given flags on `config`.
    pub fn apply(&self, config: &mut LogbookConfig) {
        if let Some(output) = &self.output {
            config.output.clone_from(output);
        }
        if self.reverse {
            config.reverse = true;
        } else if self.chronological {
            config.reverse = false;
        }
        if let Some(owner) = &self.owner {
            config.owner.clone_from(owner);
        }
        if !self.page_breaks.is_empty() {
            config.page_breaks.clone_from(&self.page_breaks);
        }
    }
}

/// Map rendering arguments.
#[derive(Debug, Default, Args)]
pub struct RenderMapCommand {
    /// Only flights whose date contains this text (e.g. "2023-05")
    #[arg(short = 'd', long, value_name = "TEXT")]
    pub filter_date: Option<String>,

    /// Draw airports only
    #[arg(long)]
    pub no_routes: bool,

    /// Airport database JSON file
    #[arg(long, value_name = "FILE")]
    pub airports: Option<PathBuf>,

    /// Output PNG file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,
}

impl RenderMapCommand {
    /// Overlay the given flags on `config`.
    pub fn apply(&self, config: &mut MapConfig) {
        if let Some(date) = &self.filter_date {
            config.filter_date.clone_from(date);
        }
        if self.no_routes {
            config.no_routes = true;
        }
        if let Some(path) = &self.airports {
            config.airports_db = Some(path.clone());
        }
        if let Some(output) = &self.output {
            config.output.clone_from(output);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
