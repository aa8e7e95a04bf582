//! Storage layer for capex-ledger
//!
//! One JSON file per record kind, each held in memory behind a `RwLock` and
//! written back atomically. `Storage` ties the repositories together with the
//! activity log.

pub mod capex;
pub mod file_io;
pub mod init;
pub mod projects;
pub mod suppliers;
pub mod users;

pub use capex::CapexRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use projects::ProjectRepository;
pub use suppliers::SupplierRepository;
pub use users::UserRepository;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType, Operation};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Capex, CapexId, Project, ProjectId};
use crate::reports::ProjectSource;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub projects: ProjectRepository,
    pub capex: CapexRepository,
    pub suppliers: SupplierRepository,
    pub users: UserRepository,
    audit: AuditLogger,
    /// Email of the logged-in user, recorded on activity log entries
    actor: Option<String>,
}

impl Storage {
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            projects: ProjectRepository::new(paths.projects_file()),
            capex: CapexRepository::new(paths.capex_file()),
            suppliers: SupplierRepository::new(paths.suppliers_file()),
            users: UserRepository::new(paths.users_file()),
            audit: AuditLogger::new(paths.audit_log()),
            actor: None,
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Attribute subsequent activity log entries to this user
    pub fn set_actor(&mut self, actor: Option<String>) {
        self.actor = actor;
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    /// Replace the in-memory records with what is on disk
    ///
    /// The server calls this before every request; the CLI is a separate
    /// process and writes straight to the files.
    pub fn load_all(&self) -> Result<(), LedgerError> {
        self.projects.load()?;
        self.capex.load()?;
        self.suppliers.load()?;
        self.users.load()?;
        Ok(())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    fn record(&self, entry: AuditEntry) -> LedgerResult<()> {
        tracing::debug!(
            operation = %entry.operation,
            entity = %entry.entity_type,
            id = %entry.entity_id,
            "activity"
        );
        self.audit.log(&entry.with_actor(self.actor.clone()))
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.record(AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Log an update; the change summary is derived from the two snapshots
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> LedgerResult<()> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };
        self.record(AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.record(AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Log a login or logout
    pub fn log_session(
        &self,
        operation: Operation,
        user_id: impl Into<String>,
        email: &str,
    ) -> LedgerResult<()> {
        self.audit.log(&AuditEntry::session(operation, user_id, email))
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

impl ProjectSource for Storage {
    fn project_by_id(&self, id: ProjectId) -> LedgerResult<Option<Project>> {
        self.projects.get(id)
    }

    fn project_by_name(&self, name: &str) -> LedgerResult<Option<Project>> {
        self.projects.get_by_name(name)
    }

    fn capex_by_ids(&self, ids: &[CapexId]) -> LedgerResult<Vec<Capex>> {
        ids.iter()
            .map(|id| {
                self.capex
                    .get(*id)?
                    .ok_or_else(|| LedgerError::capex_not_found(id.as_uuid().to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = test_storage();
        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_capex_by_ids_resolves_in_order() {
        let (_temp_dir, storage) = test_storage();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let a = Capex::new(date, "a", Money::from_units(1), Money::from_units(1));
        let b = Capex::new(date, "b", Money::from_units(2), Money::from_units(2));
        let ids = vec![b.id, a.id];
        storage.capex.upsert(a).unwrap();
        storage.capex.upsert(b).unwrap();

        let resolved = storage.capex_by_ids(&ids).unwrap();
        let types: Vec<_> = resolved.iter().map(|c| c.capex_type.as_str()).collect();
        assert_eq!(types, vec!["b", "a"]);
    }

    #[test]
    fn test_capex_by_ids_fails_on_dangling_id() {
        let (_temp_dir, storage) = test_storage();
        let err = storage.capex_by_ids(&[CapexId::new()]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_log_update_records_actor_and_diff() {
        let (_temp_dir, mut storage) = test_storage();
        storage.set_actor(Some("admin@example.com".into()));

        let before = serde_json::json!({"name": "Old"});
        let after = serde_json::json!({"name": "New"});
        storage
            .log_update(EntityType::Supplier, "s1", Some("New".into()), &before, &after)
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor.as_deref(), Some("admin@example.com"));
        assert_eq!(
            entries[0].diff_summary.as_deref(),
            Some("name: \"Old\" -> \"New\"")
        );
    }
}
