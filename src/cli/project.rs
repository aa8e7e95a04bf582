//! Project CLI commands
//!
//! Implements CLI commands for project management, opex entries, status
//! history and membership.

use chrono::Local;
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::project::{format_project_details, format_project_list};
use crate::error::LedgerResult;
use crate::models::Opex;
use crate::services::{NewProject, ProjectService, ProjectUpdate, Session, UserService};
use crate::storage::Storage;

use super::{parse_date, parse_money, parse_optional_date, parse_optional_money, require};

/// Project subcommands
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    Create {
        /// Project name (must be unique)
        name: String,
        /// Estimated start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Estimated end date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Forecasted budget spread across the estimated months
        #[arg(short, long, default_value = "0")]
        forecast: String,
        /// Total budget
        #[arg(long, default_value = "0")]
        total_budget: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Project leader (email or user ID)
        #[arg(long)]
        leader: Option<String>,
    },
    /// List projects
    List {
        /// Only projects whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
        /// Maximum number of projects to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show project details
    Show {
        /// Project name or ID
        project: String,
    },
    /// Edit a project
    Edit {
        /// Project name or ID
        project: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Estimated start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Estimated end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Actual start date (YYYY-MM-DD)
        #[arg(long)]
        actual_start: Option<String>,
        /// Actual end date (YYYY-MM-DD)
        #[arg(long)]
        actual_end: Option<String>,
        #[arg(short, long)]
        forecast: Option<String>,
        #[arg(long)]
        total_budget: Option<String>,
        /// Project leader (email or user ID)
        #[arg(long)]
        leader: Option<String>,
    },
    /// Delete a project; its capex records are detached, not deleted
    Delete {
        /// Project name or ID
        project: String,
    },
    /// Search projects by name and description
    Search {
        query: String,
        /// Maximum number of hits (defaults to the configured search limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List projects a user leads or belongs to
    ByUser {
        /// Email or user ID
        user: String,
        #[arg(short, long, default_value = "1")]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Record an opex entry on a project
    AddOpex {
        /// Project name or ID
        project: String,
        /// Person the cost is for
        #[arg(long)]
        person: String,
        /// Their role on the project
        #[arg(long, default_value = "")]
        role: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long, default_value = "0")]
        estimated: String,
        #[arg(short, long, default_value = "0")]
        actual: String,
    },
    /// Remove an opex entry by its position in `project show`
    RemoveOpex {
        project: String,
        index: usize,
    },
    /// Record a status change
    Status {
        project: String,
        status: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Add a member or change their role
    AddMember {
        project: String,
        /// Email or user ID
        user: String,
        #[arg(short, long, default_value = "member")]
        role: String,
    },
}

/// Handle a project command
pub fn handle_project_command(
    storage: &Storage,
    settings: &Settings,
    session: Option<&Session>,
    cmd: ProjectCommands,
) -> LedgerResult<()> {
    let service = ProjectService::new(storage);
    let users = UserService::new(storage);
    let currency = settings.currency_symbol.as_str();
    let policy = settings.access_control.projects;

    match cmd {
        ProjectCommands::Create {
            name,
            start,
            end,
            forecast,
            total_budget,
            description,
            leader,
        } => {
            require(session, policy)?;
            let project_leader = match leader {
                Some(l) => Some(users.resolve(&l)?.id),
                None => None,
            };

            let project = service.create(NewProject {
                name,
                description,
                estimated_start_date: parse_date(&start)?,
                estimated_end_date: parse_date(&end)?,
                forecasted_budget: parse_money(&forecast)?,
                total_budget: parse_money(&total_budget)?,
                project_leader,
            })?;

            println!("Created project: {}", project.name);
            println!("  Estimated: {} to {}", start.trim(), end.trim());
            println!(
                "  Forecast:  {}",
                project.forecasted_budget.format_with_symbol(currency)
            );
            println!("  ID: {}", project.id.as_uuid());
        }

        ProjectCommands::List { filter, limit } => {
            let projects = service.list(filter.as_deref(), limit)?;
            print!("{}", format_project_list(&projects, currency));
        }

        ProjectCommands::Show { project } => {
            let found = service.resolve(&project)?;
            print!("{}", format_project_details(&found, currency));
        }

        ProjectCommands::Edit {
            project,
            name,
            description,
            start,
            end,
            actual_start,
            actual_end,
            forecast,
            total_budget,
            leader,
        } => {
            require(session, policy)?;
            let found = service.resolve(&project)?;
            let project_leader = match leader {
                Some(l) => Some(users.resolve(&l)?.id),
                None => None,
            };

            let update = ProjectUpdate {
                name,
                description,
                estimated_start_date: parse_optional_date(start)?,
                estimated_end_date: parse_optional_date(end)?,
                actual_start_date: parse_optional_date(actual_start)?,
                actual_end_date: parse_optional_date(actual_end)?,
                forecasted_budget: parse_optional_money(forecast)?,
                total_budget: parse_optional_money(total_budget)?,
                project_leader,
            };

            let updated = service.update(found.id, update)?;
            println!("Updated project: {}", updated.name);
        }

        ProjectCommands::Delete { project } => {
            require(session, policy)?;
            let found = service.resolve(&project)?;
            let detached = found.capex_expenditures.len();
            let deleted = service.delete(found.id)?;
            println!("Deleted project: {}", deleted.name);
            if detached > 0 {
                println!("  {} capex record(s) detached", detached);
            }
        }

        ProjectCommands::Search { query, limit } => {
            let limit = limit.unwrap_or(settings.search_limit);
            let hits = service.search(&query, limit, settings.month_enumeration)?;
            if hits.is_empty() {
                println!("No projects match '{}'.", query);
            } else {
                let projects: Vec<_> = hits.into_iter().map(|h| h.project).collect();
                print!("{}", format_project_list(&projects, currency));
            }
        }

        ProjectCommands::ByUser {
            user,
            page,
            page_size,
        } => {
            let user = users.resolve(&user)?;
            let page_size = page_size.unwrap_or(settings.default_page_size);
            let page = service.by_member(user.id, page, page_size)?;

            print!("{}", format_project_list(&page.results, currency));
            println!(
                "Page {} of {} ({} project(s))",
                page.current_page,
                page.total_pages.max(1),
                page.total_results
            );
        }

        ProjectCommands::AddOpex {
            project,
            person,
            role,
            date,
            estimated,
            actual,
        } => {
            require(session, policy)?;
            let found = service.resolve(&project)?;
            let date = parse_optional_date(date)?.unwrap_or_else(|| Local::now().date_naive());
            let opex = Opex::new(
                date,
                person,
                role,
                parse_money(&estimated)?,
                parse_money(&actual)?,
            );

            let updated = service.add_opex(found.id, opex)?;
            println!(
                "Added opex to {} (opex actual now {})",
                updated.name,
                updated.total_opex_actual().format_with_symbol(currency)
            );
        }

        ProjectCommands::RemoveOpex { project, index } => {
            require(session, policy)?;
            let found = service.resolve(&project)?;
            let (updated, removed) = service.remove_opex(found.id, index)?;
            println!(
                "Removed opex for {} on {} from {}",
                removed.person_name, removed.date, updated.name
            );
        }

        ProjectCommands::Status {
            project,
            status,
            date,
        } => {
            require(session, policy)?;
            let found = service.resolve(&project)?;
            let date = parse_optional_date(date)?.unwrap_or_else(|| Local::now().date_naive());
            let updated = service.record_status(found.id, &status, date)?;
            println!("{} is now '{}'", updated.name, status.trim());
        }

        ProjectCommands::AddMember {
            project,
            user,
            role,
        } => {
            require(session, policy)?;
            let found = service.resolve(&project)?;
            let member = users.resolve(&user)?;
            let updated = service.add_member(found.id, member.id, &role)?;
            println!("Added {} to {} as {}", member.email, updated.name, role);
        }
    }

    Ok(())
}

