//! CLI commands for data export

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::error::{LedgerError, LedgerResult};
use crate::export::{csv, json, yaml};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV (spreadsheet-compatible)
    Csv,
    /// JSON (machine-readable)
    Json,
    /// YAML (human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export everything to one file
    All {
        output: PathBuf,

        /// Export format (json or yaml)
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export projects to CSV
    Projects { output: PathBuf },

    /// Export capex records to CSV
    Capex { output: PathBuf },
}

fn create_writer(output: &PathBuf) -> LedgerResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        LedgerError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> LedgerResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_writer(&output)?;
            match format {
                ExportFormat::Csv => {
                    return Err(LedgerError::Validation(
                        "A full export needs json or yaml; use `export projects` or `export capex` for CSV".into(),
                    ));
                }
                ExportFormat::Json => json::export_full_json(storage, &mut writer, pretty)?,
                ExportFormat::Yaml => yaml::export_full_yaml(storage, &mut writer)?,
            }
            println!("Full export written to: {}", output.display());
        }
        ExportCommands::Projects { output } => {
            csv::export_projects_csv(storage, create_writer(&output)?)?;
            println!(
                "Exported {} project(s) to: {}",
                storage.projects.count()?,
                output.display()
            );
        }
        ExportCommands::Capex { output } => {
            csv::export_capex_csv(storage, create_writer(&output)?)?;
            println!(
                "Exported {} capex record(s) to: {}",
                storage.capex.count()?,
                output.display()
            );
        }
    }

    Ok(())
}
