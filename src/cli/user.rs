//! User CLI commands
//!
//! Registration, login/logout and account administration. Passwords come
//! from `--password`, the `CAPEX_LEDGER_PASSWORD` environment variable, or a
//! hidden prompt, and are wiped from memory after use.

use chrono::Utc;
use clap::Subcommand;
use zeroize::Zeroizing;

use crate::config::settings::Settings;
use crate::display::user::{format_user_details, format_user_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{UserStatus, UserType};
use crate::services::{NewUser, Session, SessionStore, UserService, UserUpdate};
use crate::storage::Storage;

use super::require;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user (the first user becomes an admin)
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long = "first")]
        firstname: String,
        #[arg(long = "last")]
        lastname: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        position: Option<String>,
        /// User type (admin, user, viewer, supplier)
        #[arg(short = 't', long = "type")]
        user_type: Option<String>,
        #[arg(long, env = "CAPEX_LEDGER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log in and start a session
    Login {
        email: String,
        #[arg(long, env = "CAPEX_LEDGER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List users
    List,
    /// Show user details
    Show {
        /// Email or user ID
        user: String,
    },
    /// Search users by username, name and email
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Edit a user profile
    Edit {
        /// Email or user ID
        user: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long = "first")]
        firstname: Option<String>,
        #[arg(long = "last")]
        lastname: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Comma-separated skills
        #[arg(long, value_delimiter = ',')]
        skills: Option<Vec<String>>,
        /// User type (admin only)
        #[arg(short = 't', long = "type")]
        user_type: Option<String>,
        /// Account status: active, deactivated, archived (admin only)
        #[arg(long)]
        status: Option<String>,
    },
    /// Change your own password
    Passwd {
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        new: Option<String>,
    },
    /// Delete a user
    Delete {
        user: String,
    },
    /// Deactivate or archive users inactive past the configured thresholds
    Cleanup,
}

/// Take a password from the argument or prompt for it without echo
fn read_password(given: Option<String>, prompt: &str) -> LedgerResult<Zeroizing<String>> {
    match given {
        Some(p) => Ok(Zeroizing::new(p)),
        None => rpassword::prompt_password(prompt)
            .map(Zeroizing::new)
            .map_err(|e| LedgerError::Io(format!("Failed to read password: {}", e))),
    }
}

fn parse_user_type(value: &str) -> LedgerResult<UserType> {
    UserType::parse(value).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid user type: '{}'. Valid types: admin, user, viewer, supplier",
            value
        ))
    })
}

fn parse_user_status(value: &str) -> LedgerResult<UserStatus> {
    UserStatus::parse(value).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Invalid status: '{}'. Valid statuses: active, deactivated, archived",
            value
        ))
    })
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    settings: &Settings,
    session: Option<&Session>,
    cmd: UserCommands,
) -> LedgerResult<()> {
    let service = UserService::new(storage);
    let admin_policy = settings.access_control.users;

    match cmd {
        UserCommands::Register {
            username,
            email,
            firstname,
            lastname,
            phone,
            position,
            user_type,
            password,
        } => {
            if !service.is_first_user()? {
                require(session, admin_policy)?;
            }
            let user_type = user_type.as_deref().map(parse_user_type).transpose()?;
            let password = read_password(password, "Password: ")?;

            let user = service.register(NewUser {
                username,
                firstname,
                lastname,
                email,
                password: password.to_string(),
                phone_number: phone,
                position,
                user_type,
            })?;

            println!("Registered user: {}", user.email);
            println!("  Type: {}", user.user_type);
            println!("  ID: {}", user.id.as_uuid());
        }

        UserCommands::Login { email, password } => {
            let password = read_password(password, "Password: ")?;
            let (user, session) = service.login(&email, &password, &settings.sessions)?;
            println!("Logged in as {} ({})", user.email, user.user_type);
            println!(
                "  Session expires: {}",
                session.expires_at.format("%Y-%m-%d %H:%M UTC")
            );
        }

        UserCommands::Logout => match service.logout()? {
            Some(session) => println!("Logged out {}", session.email),
            None => println!("Not logged in."),
        },

        UserCommands::Whoami => {
            let current = SessionStore::new(storage.paths()).current(Utc::now())?;
            match current {
                Some(session) => {
                    let user = service
                        .get(session.user_id)?
                        .ok_or_else(|| LedgerError::user_not_found(session.user_id.as_uuid().to_string()))?;
                    print!("{}", format_user_details(&user));
                    println!(
                        "  Session expires: {}",
                        session.expires_at.format("%Y-%m-%d %H:%M UTC")
                    );
                }
                None => println!("Not logged in."),
            }
        }

        UserCommands::List => {
            let users = service.list()?;
            print!("{}", format_user_list(&users));
        }

        UserCommands::Show { user } => {
            let found = service.resolve(&user)?;
            print!("{}", format_user_details(&found));
        }

        UserCommands::Search { query, limit } => {
            let users = service.search(&query, limit.unwrap_or(settings.search_limit))?;
            print!("{}", format_user_list(&users));
        }

        UserCommands::Edit {
            user,
            username,
            firstname,
            lastname,
            email,
            phone,
            position,
            company,
            bio,
            skills,
            user_type,
            status,
        } => {
            let found = service.resolve(&user)?;
            let editing_self = session.is_some_and(|s| s.user_id == found.id);
            if !editing_self || user_type.is_some() || status.is_some() {
                require(session, admin_policy)?;
            }

            let update = UserUpdate {
                username,
                firstname,
                lastname,
                email,
                phone_number: phone,
                position,
                company,
                bio,
                skills,
                user_type: user_type.as_deref().map(parse_user_type).transpose()?,
                status: status.as_deref().map(parse_user_status).transpose()?,
                ..Default::default()
            };

            let updated = service.update(found.id, update)?;
            println!("Updated user: {}", updated.email);
        }

        UserCommands::Passwd { current, new } => {
            let session = session.ok_or_else(|| {
                LedgerError::Unauthorized("Log in first with `ledger user login`".into())
            })?;
            let current = read_password(current, "Current password: ")?;
            let new = read_password(new, "New password: ")?;
            service.change_password(session.user_id, &current, &new)?;
            println!("Password changed.");
        }

        UserCommands::Delete { user } => {
            let actor = require(session, admin_policy)?;
            let found = service.resolve(&user)?;
            if found.id == actor.user_id {
                return Err(LedgerError::Validation(
                    "You cannot delete your own account".into(),
                ));
            }
            let deleted = service.delete(found.id)?;
            println!("Deleted user: {}", deleted.email);
        }

        UserCommands::Cleanup => {
            require(session, admin_policy)?;
            let report = service.cleanup_inactive(&settings.inactivity, Utc::now())?;
            if report.is_empty() {
                println!("No inactive users.");
            }
            for user in &report.deactivated {
                println!("Deactivated: {}", user.email);
            }
            for user in &report.archived {
                println!("Archived:    {}", user.email);
            }
        }
    }

    Ok(())
}
