//! YAML Export functionality
//!
//! Exports the complete dataset, or a single report, to human-readable YAML.

use std::io::Write;

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export the full dataset as YAML with a short comment header
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage)?;

    let header = format!(
        "# capex-ledger full export\n# Generated: {}\n# App Version: {}\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    export_value_yaml(&export, writer)
}

/// Write any serializable report as YAML
pub fn export_value_yaml<T: Serialize, W: Write>(value: &T, writer: &mut W) -> LedgerResult<()> {
    serde_yaml::to_writer(writer, value).map_err(|e| LedgerError::Export(e.to_string()))
}
