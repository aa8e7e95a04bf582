use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use capex_ledger::cli::{
    handle_audit_command, handle_capex_command, handle_export_command, handle_project_command,
    handle_report_command, handle_supplier_command, handle_user_command,
};
use capex_ledger::config::{paths::LedgerPaths, settings::Settings};
use capex_ledger::logging::init_logging;
use capex_ledger::server::{run_server, AppState};
use capex_ledger::services::SessionStore;
use capex_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Project expenditure tracking with monthly budget-vs-actual breakdowns",
    long_about = "capex-ledger tracks projects, their operational (opex) and capital \
                  (capex) expenditure, suppliers and users, and reports each project's \
                  forecast budget against actual and estimated spend month by month."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management commands
    #[command(subcommand)]
    Project(capex_ledger::cli::ProjectCommands),

    /// Capital expenditure commands
    #[command(subcommand)]
    Capex(capex_ledger::cli::CapexCommands),

    /// Supplier management commands
    #[command(subcommand)]
    Supplier(capex_ledger::cli::SupplierCommands),

    /// User accounts and login sessions
    #[command(subcommand)]
    User(capex_ledger::cli::UserCommands),

    /// Dashboard and monthly breakdown reports
    #[command(subcommand)]
    Report(capex_ledger::cli::ReportCommands),

    /// Export data to CSV, JSON or YAML
    #[command(subcommand)]
    Export(capex_ledger::cli::ExportCommands),

    /// Show recent activity
    Audit(capex_ledger::cli::AuditArgs),

    /// Run the REST API server
    Serve {
        /// Address to bind (defaults to the configured one)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let session = SessionStore::new(&paths).current(Utc::now())?;
    storage.set_actor(session.as_ref().map(|s| s.email.clone()));
    let session = session.as_ref();

    match cli.command {
        Some(Commands::Project(cmd)) => {
            handle_project_command(&storage, &settings, session, cmd)?;
        }
        Some(Commands::Capex(cmd)) => {
            handle_capex_command(&storage, &settings, session, cmd)?;
        }
        Some(Commands::Supplier(cmd)) => {
            handle_supplier_command(&storage, &settings, session, cmd)?;
        }
        Some(Commands::User(cmd)) => {
            handle_user_command(&storage, &settings, session, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, cmd)?;
        }
        Some(Commands::Audit(args)) => {
            handle_audit_command(&storage, &settings, session, args)?;
        }
        Some(Commands::Serve { bind }) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_server(AppState::new(storage, settings), bind))?;
        }
        Some(Commands::Init) => {
            println!("Initializing capex-ledger at: {}", paths.base_dir().display());
            capex_ledger::storage::init::initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Register the first (admin) user with 'ledger user register'.");
        }
        Some(Commands::Config) => {
            println!("capex-ledger Configuration");
            println!("==========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Activity log:     {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:    {}", settings.currency_symbol);
            println!("  Month enumeration:  {}", settings.month_enumeration);
            println!("  Default page size:  {}", settings.default_page_size);
            println!("  Search limit:       {}", settings.search_limit);
            println!("  Server bind:        {}", settings.server.bind_address);
            println!(
                "  Session lifetimes:  user {} min, admin {} min",
                settings.sessions.user_ttl_minutes, settings.sessions.admin_ttl_minutes
            );
            println!(
                "  Inactivity:         deactivate after {} months, archive after {}",
                settings.inactivity.deactivate_after_months,
                settings.inactivity.archive_after_months
            );
            if let Some(s) = session {
                println!();
                println!("Logged in as {} ({})", s.email, s.user_type);
            }
        }
        None => {
            println!("capex-ledger - project expenditure tracking");
            println!();
            println!("Run 'ledger --help' for usage information.");
        }
    }

    Ok(())
}
