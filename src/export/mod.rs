//! Export module for capex-ledger
//!
//! Provides data export in multiple formats:
//! - CSV: project and capex tables (spreadsheet-compatible)
//! - JSON: machine-readable full export, or any single report
//! - YAML: human-readable full export, or any single report

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::{export_capex_csv, export_projects_csv};
pub use json::{export_full_json, export_value_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, export_value_yaml};
