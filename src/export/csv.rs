//! CSV Export functionality
//!
//! Exports projects and capex records to spreadsheet-friendly CSV. Report
//! CSV (breakdown, dashboard) lives with the reports themselves.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

fn export_err(e: csv::Error) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// Export all projects, one row each
pub fn export_projects_csv<W: Write>(storage: &Storage, writer: W) -> LedgerResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "ID",
        "Name",
        "Estimated Start",
        "Estimated End",
        "Total Budget",
        "Forecasted Budget",
        "Opex Actual",
        "Capex Records",
        "Status",
    ])
    .map_err(export_err)?;

    for project in storage.projects.get_all()? {
        csv.write_record([
            project.id.as_uuid().to_string(),
            project.name.clone(),
            project
                .estimated_start_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            project
                .estimated_end_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            format!("{:.2}", project.total_budget.to_units()),
            format!("{:.2}", project.forecasted_budget.to_units()),
            format!("{:.2}", project.total_opex_actual().to_units()),
            project.capex_expenditures.len().to_string(),
            project
                .current_status()
                .map(|s| s.status.clone())
                .unwrap_or_default(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(LedgerError::from)
}

/// Export all capex records with project and supplier names resolved
pub fn export_capex_csv<W: Write>(storage: &Storage, writer: W) -> LedgerResult<()> {
    let project_names: HashMap<_, _> = storage
        .projects
        .get_all()?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let supplier_names: HashMap<_, _> = storage
        .suppliers
        .get_all()?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "ID",
        "Date",
        "Type",
        "Description",
        "Estimated",
        "Actual",
        "Status",
        "Project",
        "Supplier",
    ])
    .map_err(export_err)?;

    for capex in storage.capex.get_all()? {
        let project = capex
            .project_id
            .map(|id| {
                project_names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string())
            })
            .unwrap_or_default();
        let supplier = capex
            .supplier_id
            .map(|id| {
                supplier_names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string())
            })
            .unwrap_or_default();

        csv.write_record([
            capex.id.as_uuid().to_string(),
            capex.date.to_string(),
            capex.capex_type.clone(),
            capex.description.clone(),
            format!("{:.2}", capex.estimated_amount.to_units()),
            format!("{:.2}", capex.actual_amount.to_units()),
            capex.status.clone(),
            project,
            supplier,
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(LedgerError::from)
}
