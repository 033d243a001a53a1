//! `logbook` - CLI for the logbook exporter
//!
//! This binary reads the configured flight sheet and writes the PDF logbook or
//! the route map.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use logbook::cli::{Cli, Command, ConfigCommand, ExportCommand, RenderMapCommand};
use logbook::{export, init_logging, source, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match cli.command {
        Command::Export(cmd) => handle_export(cli.config, &cmd),
        Command::RenderMap(cmd) => handle_render_map(cli.config, &cmd),
        Command::Config(cmd) => handle_config(cli.config, cmd),
        Command::Version => {
            println!("logbook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn handle_export(config_path: Option<PathBuf>, cmd: &ExportCommand) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    cmd.apply(&mut config.logbook);
    config.validate().context("invalid configuration")?;

    let reader = source::from_config(&config.source)?;
    let report = export::export_pdf(reader.as_ref(), &config.logbook)
        .with_context(|| format!("failed to export {}", reader.describe()))?;
    println!("{report}");
    Ok(())
}

fn handle_render_map(config_path: Option<PathBuf>, cmd: &RenderMapCommand) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    cmd.apply(&mut config.map);
    config.validate().context("invalid configuration")?;

    let reader = source::from_config(&config.source)?;
    let report = export::export_map(reader.as_ref(), &config.map)
        .with_context(|| format!("failed to render map of {}", reader.describe()))?;
    println!("{report}");
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mut config = load_config(config_path)?;
            if config.source.api_key.is_some() {
                config.source.api_key = Some("********".to_string());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            if path.exists() && !force {
                bail!(
                    "{} already exists, use --force to overwrite it",
                    path.display()
                );
            }
            Config::write_template(&path)?;
            println!("Configuration written to {}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            let config = load_config(Some(path))?;
            config.validate().context("invalid configuration")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    let or_unset = |value: Option<String>| value.unwrap_or_else(|| "(not set)".to_string());

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Source]");
    println!("  Kind:               {:?}", config.source.kind);
    println!(
        "  File name:          {}",
        or_unset(
            config
                .source
                .file_name
                .as_ref()
                .map(|p| p.display().to_string())
        )
    );
    println!(
        "  Spreadsheet id:     {}",
        or_unset(config.source.spreadsheet_id.clone())
    );
    println!("  API key:            {}", or_unset(config.source.api_key.clone()));
    println!("  Sheet name:         {}", config.source.sheet_name);
    println!("  Start row:          {}", config.source.start_row);
    println!();
    println!("[Logbook]");
    println!("  Owner:              {}", config.logbook.owner);
    println!("  Page breaks:        {:?}", config.logbook.page_breaks);
    println!("  Reverse:            {}", config.logbook.reverse);
    println!("  Output:             {}", config.logbook.output.display());
    println!();
    println!("[Map]");
    println!("  Filter date:        {}", config.map.filter_date);
    println!("  No routes:          {}", config.map.no_routes);
    println!(
        "  Airports database:  {}",
        config
            .map
            .airports_db
            .as_ref()
            .map_or_else(|| "(bundled)".to_string(), |p| p.display().to_string())
    );
    println!("  Output:             {}", config.map.output.display());
    println!(
        "  Size:               {}x{}",
        config.map.width, config.map.height
    );
}
