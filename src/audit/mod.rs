//! Activity log for capex-ledger
//!
//! Every create, update and delete of a project, capex record, supplier or
//! user is appended to `audit.log` with before/after snapshots, along with
//! logins and logouts.
//!
//! - `AuditEntry`: one logged operation
//! - `AuditLogger`: appends entries as JSON lines and reads them back
//! - `generate_diff`: one-line summary of what an update changed

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
