//! Service layer for capex-ledger
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, uniqueness checks, cross-entity links and audit
//! logging.

pub mod auth;
pub mod capex;
pub mod project;
pub mod search;
pub mod supplier;
pub mod user;

pub use auth::{authorize, hash_password, verify_password, Session, SessionStore};
pub use capex::{CapexService, CapexUpdate, NewCapex, ProjectLink};
pub use project::{NewProject, ProjectSearchHit, ProjectService, ProjectUpdate};
pub use search::{rank, relevance, Page};
pub use supplier::{SupplierService, SupplierUpdate};
pub use user::{CleanupReport, NewUser, UserService, UserUpdate};
