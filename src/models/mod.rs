//! Core data models for capex-ledger
//!
//! Projects with their embedded opex entries, standalone capex records,
//! suppliers and users.

pub mod capex;
pub mod ids;
pub mod money;
pub mod project;
pub mod supplier;
pub mod user;

pub use capex::{Capex, CapexValidationError};
pub use ids::{CapexId, ProjectId, SupplierId, UserId};
pub use money::Money;
pub use project::{Member, Opex, Project, ProjectValidationError, StatusEntry};
pub use supplier::{Supplier, SupplierValidationError};
pub use user::{AccessPolicy, Address, User, UserStatus, UserType, UserValidationError};
