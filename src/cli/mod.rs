//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the clap
//! argument parsing with the service layer. Mutating commands need a login
//! session whose user type the configured access policy admits.

pub mod audit;
pub mod capex;
pub mod export;
pub mod project;
pub mod report;
pub mod supplier;
pub mod user;

pub use audit::{handle_audit_command, AuditArgs};
pub use capex::{handle_capex_command, CapexCommands};
pub use export::{handle_export_command, ExportCommands};
pub use project::{handle_project_command, ProjectCommands};
pub use report::{handle_report_command, ReportCommands};
pub use supplier::{handle_supplier_command, SupplierCommands};
pub use user::{handle_user_command, UserCommands};

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccessPolicy, Money};
use crate::services::{authorize, Session};

/// Parse a `YYYY-MM-DD` argument
pub(crate) fn parse_date(value: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!(
            "Invalid date format: '{}'. Use YYYY-MM-DD",
            value
        ))
    })
}

/// Parse a money argument such as "1500" or "1500.50"
pub(crate) fn parse_money(value: &str) -> LedgerResult<Money> {
    Money::parse(value).map_err(|e| {
        LedgerError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '1000.00' or '1000'. Error: {}",
            value, e
        ))
    })
}

pub(crate) fn parse_optional_date(value: Option<String>) -> LedgerResult<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

pub(crate) fn parse_optional_money(value: Option<String>) -> LedgerResult<Option<Money>> {
    value.as_deref().map(parse_money).transpose()
}

/// Require a session allowed by `policy` before a command runs
pub(crate) fn require(session: Option<&Session>, policy: AccessPolicy) -> LedgerResult<&Session> {
    let session = authorize(session, policy)?;
    tracing::debug!(user = %session.email, policy = %policy, "authorized");
    Ok(session)
}
