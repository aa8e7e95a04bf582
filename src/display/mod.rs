//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models as plain-text tables and
//! detail views.

pub mod capex;
pub mod project;
pub mod supplier;
pub mod user;

pub use capex::{format_capex_details, format_capex_list};
pub use project::{format_project_details, format_project_list};
pub use supplier::{format_supplier_details, format_supplier_list};
pub use user::{format_user_details, format_user_list};
