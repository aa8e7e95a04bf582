//! capex-ledger - project expenditure tracking
//!
//! Tracks projects with their opex entries, capital expenditure (capex)
//! records, suppliers and users, and derives per-project monthly breakdowns
//! of forecast budget against actual and estimated spend.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (projects, capex, suppliers, users)
//! - `storage`: JSON file storage layer
//! - `audit`: Activity logging
//! - `services`: Business logic layer, including login sessions
//! - `reports`: Monthly breakdown engine and project dashboard
//! - `display` / `export`: Terminal tables and CSV/JSON/YAML output
//! - `cli`: Command handlers
//! - `server`: Read-only REST API
//!
//! # Example
//!
//! ```rust,ignore
//! use capex_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use capex_ledger::reports::compute_dashboard;
//! use capex_ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let dashboard = compute_dashboard(&storage, "Apollo", settings.month_enumeration)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod server;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
