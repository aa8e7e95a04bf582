//! Supplier CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::supplier::{format_supplier_details, format_supplier_list};
use crate::error::LedgerResult;
use crate::services::{Session, SupplierService, SupplierUpdate, UserService};
use crate::storage::Storage;

use super::require;

/// Supplier subcommands
#[derive(Subcommand)]
pub enum SupplierCommands {
    /// Add a supplier
    Create {
        /// Supplier name (must be unique)
        name: String,
        #[arg(short, long, default_value = "")]
        address: String,
        /// Logo URL
        #[arg(long)]
        logo: Option<String>,
    },
    /// List suppliers
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Show supplier details
    Show {
        /// Supplier name or ID
        supplier: String,
    },
    /// Edit a supplier
    Edit {
        supplier: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        #[arg(long)]
        logo: Option<String>,
    },
    /// Add a contact person
    AddContact {
        supplier: String,
        /// Email or user ID
        user: String,
    },
    /// Delete a supplier
    Delete {
        supplier: String,
    },
    /// Search suppliers by name and address
    Search {
        query: String,
        #[arg(short, long, default_value = "1")]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

/// Handle a supplier command
pub fn handle_supplier_command(
    storage: &Storage,
    settings: &Settings,
    session: Option<&Session>,
    cmd: SupplierCommands,
) -> LedgerResult<()> {
    let service = SupplierService::new(storage);
    let policy = settings.access_control.suppliers;

    match cmd {
        SupplierCommands::Create {
            name,
            address,
            logo,
        } => {
            require(session, policy)?;
            let supplier = service.create(&name, &address, logo)?;
            println!("Created supplier: {}", supplier.name);
            println!("  ID: {}", supplier.id.as_uuid());
        }

        SupplierCommands::List { page, page_size } => {
            let page_size = page_size.unwrap_or(settings.default_page_size);
            let page = service.list_page(page, page_size)?;
            print!("{}", format_supplier_list(&page.results));
            if page.total_pages > 1 {
                println!("Page {} of {}", page.current_page, page.total_pages);
            }
        }

        SupplierCommands::Show { supplier } => {
            let found = service.resolve(&supplier)?;
            print!("{}", format_supplier_details(&found));
        }

        SupplierCommands::Edit {
            supplier,
            name,
            address,
            logo,
        } => {
            require(session, policy)?;
            let found = service.resolve(&supplier)?;
            if name.is_none() && address.is_none() && logo.is_none() {
                println!("No changes specified. Use --name, --address or --logo.");
                return Ok(());
            }
            let updated = service.update(found.id, SupplierUpdate { name, address, logo })?;
            println!("Updated supplier: {}", updated.name);
        }

        SupplierCommands::AddContact { supplier, user } => {
            require(session, policy)?;
            let found = service.resolve(&supplier)?;
            let contact = UserService::new(storage).resolve(&user)?;
            let updated = service.add_contact(found.id, contact.id)?;
            println!("Added {} as a contact for {}", contact.email, updated.name);
        }

        SupplierCommands::Delete { supplier } => {
            require(session, policy)?;
            let found = service.resolve(&supplier)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted supplier: {}", deleted.name);
        }

        SupplierCommands::Search {
            query,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(settings.default_page_size);
            let page = service.search(&query, page, page_size)?;
            print!("{}", format_supplier_list(&page.results));
            println!(
                "Page {} of {} ({} supplier(s))",
                page.current_page,
                page.total_pages.max(1),
                page.total_results
            );
        }
    }

    Ok(())
}
