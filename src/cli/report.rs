//! CLI commands for reports
//!
//! Prints a project's dashboard or monthly breakdown, or writes it to a file
//! (or stdout) as CSV, JSON or YAML.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_value_json, export_value_yaml};
use crate::reports::{compute_dashboard, BreakdownReport, MonthEnumeration};
use crate::services::ProjectService;
use crate::storage::Storage;

use super::export::ExportFormat;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Budget totals, opex/capex split and monthly series for a project
    Dashboard {
        /// Project name
        project: String,

        #[command(flatten)]
        output: ReportOutput,
    },

    /// Month-by-month budget against actual and estimated spend
    Breakdown {
        /// Project name or ID
        project: String,

        #[command(flatten)]
        output: ReportOutput,
    },
}

/// Where and how a report is written
#[derive(clap::Args, Debug)]
pub struct ReportOutput {
    /// Write to this file instead of the terminal
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format; with no --output the result goes to stdout
    #[arg(short, long, value_enum)]
    format: Option<ExportFormat>,

    /// Month enumeration (start-year or full-range); defaults to the configured policy
    #[arg(long)]
    months: Option<String>,
}

impl ReportOutput {
    fn enumeration(&self, settings: &Settings) -> LedgerResult<MonthEnumeration> {
        match &self.months {
            Some(value) => MonthEnumeration::parse(value).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Invalid month enumeration: '{}'. Use start-year or full-range",
                    value
                ))
            }),
            None => Ok(settings.month_enumeration),
        }
    }

    /// The export target, or `None` when the report should be printed as a table
    fn writer(&self) -> LedgerResult<Option<(ExportFormat, Box<dyn Write>)>> {
        match (&self.output, self.format) {
            (None, None) => Ok(None),
            (Some(path), format) => {
                let file = File::create(path).map_err(|e| {
                    LedgerError::Export(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(Some((
                    format.unwrap_or(ExportFormat::Csv),
                    Box::new(BufWriter::new(file)),
                )))
            }
            (None, Some(format)) => Ok(Some((format, Box::new(io::stdout().lock())))),
        }
    }

    fn announce(&self) {
        if let Some(path) = &self.output {
            eprintln!("Report exported to: {}", path.display());
        }
    }
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> LedgerResult<()> {
    match cmd {
        ReportCommands::Dashboard { project, output } => {
            handle_dashboard(storage, settings, &project, &output)
        }
        ReportCommands::Breakdown { project, output } => {
            handle_breakdown(storage, settings, &project, &output)
        }
    }
}

fn handle_dashboard(
    storage: &Storage,
    settings: &Settings,
    project_name: &str,
    output: &ReportOutput,
) -> LedgerResult<()> {
    let enumeration = output.enumeration(settings)?;
    let summary = compute_dashboard(storage, project_name, enumeration)?
        .ok_or_else(|| LedgerError::project_not_found(project_name))?;

    match output.writer()? {
        None => print!(
            "{}",
            summary.format_terminal(project_name, &settings.currency_symbol)
        ),
        Some((format, mut writer)) => {
            match format {
                ExportFormat::Csv => summary.export_csv(&mut writer)?,
                ExportFormat::Json => export_value_json(&summary, &mut writer, true)?,
                ExportFormat::Yaml => export_value_yaml(&summary, &mut writer)?,
            }
            writer.flush()?;
            output.announce();
        }
    }

    Ok(())
}

fn handle_breakdown(
    storage: &Storage,
    settings: &Settings,
    project: &str,
    output: &ReportOutput,
) -> LedgerResult<()> {
    let enumeration = output.enumeration(settings)?;
    let project = ProjectService::new(storage).resolve(project)?;
    let report = BreakdownReport::generate(storage, &project, enumeration)?;

    match output.writer()? {
        None => print!("{}", report.format_terminal(&settings.currency_symbol)),
        Some((format, mut writer)) => {
            match format {
                ExportFormat::Csv => report.export_csv(&mut writer)?,
                ExportFormat::Json => export_value_json(&report.rows, &mut writer, true)?,
                ExportFormat::Yaml => export_value_yaml(&report.rows, &mut writer)?,
            }
            writer.flush()?;
            output.announce();
        }
    }

    Ok(())
}
