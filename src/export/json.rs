//! JSON Export functionality
//!
//! Exports the complete dataset, or a single report, to JSON.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Capex, Project, Supplier, User};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full dataset export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub projects: Vec<Project>,
    pub capex: Vec<Capex>,
    pub suppliers: Vec<Supplier>,

    /// Users with their password hashes blanked out
    pub users: Vec<User>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub project_count: usize,
    pub capex_count: usize,
    pub supplier_count: usize,
    pub user_count: usize,

    /// Earliest estimated project start
    pub earliest_start: Option<String>,

    /// Latest estimated project end
    pub latest_end: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> LedgerResult<Self> {
        let projects = storage.projects.get_all()?;
        let capex = storage.capex.get_all()?;
        let suppliers = storage.suppliers.get_all()?;
        let users: Vec<User> = storage
            .users
            .get_all()?
            .into_iter()
            .map(|mut u| {
                u.password_hash.clear();
                u
            })
            .collect();

        let metadata = ExportMetadata {
            project_count: projects.len(),
            capex_count: capex.len(),
            supplier_count: suppliers.len(),
            user_count: users.len(),
            earliest_start: projects
                .iter()
                .filter_map(|p| p.estimated_start_date)
                .min()
                .map(|d| d.to_string()),
            latest_end: projects
                .iter()
                .filter_map(|p| p.estimated_end_date)
                .max()
                .map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            projects,
            capex,
            suppliers,
            users,
            metadata,
        })
    }

    /// Check the schema version and the project/capex links in both directions
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let project_ids: HashSet<_> = self.projects.iter().map(|p| p.id).collect();
        let capex_ids: HashSet<_> = self.capex.iter().map(|c| c.id).collect();

        for project in &self.projects {
            for capex_id in &project.capex_expenditures {
                if !capex_ids.contains(capex_id) {
                    return Err(format!(
                        "Project {} references unknown capex {}",
                        project.name,
                        capex_id.as_uuid()
                    ));
                }
            }
        }

        for capex in &self.capex {
            if let Some(project_id) = capex.project_id {
                if !project_ids.contains(&project_id) {
                    return Err(format!(
                        "Capex {} references unknown project {}",
                        capex.id.as_uuid(),
                        project_id.as_uuid()
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Export the full dataset as JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage)?;
    export_value_json(&export, writer, pretty)
}

/// Write any serializable report as JSON
pub fn export_value_json<T: Serialize, W: Write>(value: &T, writer: &mut W, pretty: bool) -> LedgerResult<()> {
    let result = if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)
    } else {
        serde_json::to_writer(&mut *writer, value)
    };
    result.map_err(|e| LedgerError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| LedgerError::Export(e.to_string()))
}
