//! Activity log CLI command

use clap::Args;

use crate::audit::EntityType;
use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::services::Session;
use crate::storage::Storage;

use super::require;

/// Show recent activity
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Number of entries to show
    #[arg(short = 'n', long, default_value = "20")]
    count: usize,

    /// Only entries for this kind of record (project, capex, supplier, user)
    #[arg(short, long)]
    entity: Option<String>,
}

pub fn handle_audit_command(
    storage: &Storage,
    settings: &Settings,
    session: Option<&Session>,
    args: AuditArgs,
) -> LedgerResult<()> {
    require(session, settings.access_control.audit)?;

    let entity = match args.entity.as_deref() {
        Some(value) => Some(EntityType::parse(value).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Invalid entity type: '{}'. Valid types: project, capex, supplier, user",
                value
            ))
        })?),
        None => None,
    };

    let entries = storage.audit().read_recent(args.count, entity)?;
    if entries.is_empty() {
        println!("No activity recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }

    Ok(())
}
