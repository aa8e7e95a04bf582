//! Capex CLI commands
//!
//! Capex records are addressed by full ID or by the short `cpx-` ID shown in
//! listings. Projects and suppliers are addressed by name or ID.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::capex::{format_capex_details, format_capex_list};
use crate::error::LedgerResult;
use crate::services::{
    CapexService, CapexUpdate, NewCapex, ProjectLink, ProjectService, Session, SupplierService,
};
use crate::storage::Storage;

use super::{parse_date, parse_money, parse_optional_date, parse_optional_money, require};

/// Capex subcommands
#[derive(Subcommand)]
pub enum CapexCommands {
    /// Record a capital expenditure
    Create {
        /// Expenditure type (e.g. hardware, licence)
        #[arg(short = 't', long = "type")]
        capex_type: String,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Estimated amount
        #[arg(short, long)]
        estimated: String,
        /// Actual amount
        #[arg(short, long)]
        actual: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Status (defaults to "pending")
        #[arg(short, long)]
        status: Option<String>,
        /// Project name or ID to link
        #[arg(short, long)]
        project: Option<String>,
        /// Supplier name or ID
        #[arg(long)]
        supplier: Option<String>,
    },
    /// List capex records, newest first
    List {
        /// Only records linked to this project
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Show a capex record
    Show {
        /// Capex ID
        id: String,
    },
    /// Edit a capex record
    Edit {
        /// Capex ID
        id: String,
        #[arg(short = 't', long = "type")]
        capex_type: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        estimated: Option<String>,
        #[arg(short, long)]
        actual: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
        /// Move the record to this project
        #[arg(short, long, conflicts_with = "detach")]
        project: Option<String>,
        /// Unlink the record from its project
        #[arg(long)]
        detach: bool,
        #[arg(long)]
        supplier: Option<String>,
    },
    /// Delete a capex record and unlink it from its project
    Delete {
        /// Capex ID
        id: String,
    },
    /// Search by text, or by a supplier or project ID
    Search {
        query: String,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

/// Handle a capex command
pub fn handle_capex_command(
    storage: &Storage,
    settings: &Settings,
    session: Option<&Session>,
    cmd: CapexCommands,
) -> LedgerResult<()> {
    let service = CapexService::new(storage);
    let projects = ProjectService::new(storage);
    let suppliers = SupplierService::new(storage);
    let currency = settings.currency_symbol.as_str();
    let policy = settings.access_control.capex;

    match cmd {
        CapexCommands::Create {
            capex_type,
            date,
            estimated,
            actual,
            description,
            status,
            project,
            supplier,
        } => {
            require(session, policy)?;
            let project_id = match project {
                Some(p) => Some(projects.resolve(&p)?.id),
                None => None,
            };
            let supplier_id = match supplier {
                Some(s) => Some(suppliers.resolve(&s)?.id),
                None => None,
            };

            let capex = service.create(NewCapex {
                date: parse_date(&date)?,
                capex_type,
                description,
                estimated_amount: parse_money(&estimated)?,
                actual_amount: parse_money(&actual)?,
                status,
                supplier_id,
                project_id,
            })?;

            println!("Created capex: {} {}", capex.id, capex.capex_type);
            println!(
                "  Actual: {}",
                capex.actual_amount.format_with_symbol(currency)
            );
            println!("  ID: {}", capex.id.as_uuid());
        }

        CapexCommands::List { project } => {
            let records = match project {
                Some(p) => service.list_by_project(projects.resolve(&p)?.id)?,
                None => service.list()?,
            };
            print!("{}", format_capex_list(&records, currency));
        }

        CapexCommands::Show { id } => {
            let capex = service.resolve(&id)?;
            print!("{}", format_capex_details(&capex, currency));
        }

        CapexCommands::Edit {
            id,
            capex_type,
            date,
            estimated,
            actual,
            description,
            status,
            project,
            detach,
            supplier,
        } => {
            require(session, policy)?;
            let capex = service.resolve(&id)?;

            let project = match (project, detach) {
                (Some(p), _) => ProjectLink::Assign(projects.resolve(&p)?.id),
                (None, true) => ProjectLink::Detach,
                (None, false) => ProjectLink::Keep,
            };
            let supplier_id = match supplier {
                Some(s) => Some(suppliers.resolve(&s)?.id),
                None => None,
            };

            let updated = service.update(
                capex.id,
                CapexUpdate {
                    date: parse_optional_date(date)?,
                    capex_type,
                    description,
                    estimated_amount: parse_optional_money(estimated)?,
                    actual_amount: parse_optional_money(actual)?,
                    status,
                    supplier_id,
                    project,
                },
            )?;
            println!("Updated capex: {} {}", updated.id, updated.capex_type);
        }

        CapexCommands::Delete { id } => {
            require(session, policy)?;
            let capex = service.resolve(&id)?;
            let deleted = service.delete(capex.id)?;
            println!("Deleted capex: {} {}", deleted.id, deleted.capex_type);
        }

        CapexCommands::Search {
            query,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(settings.default_page_size);
            let page = service.search(&query, page, page_size)?;

            print!("{}", format_capex_list(&page.results, currency));
            println!(
                "Page {} of {} ({} record(s))",
                page.current_page,
                page.total_pages.max(1),
                page.total_results
            );
        }
    }

    Ok(())
}
