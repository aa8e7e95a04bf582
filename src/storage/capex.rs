//! Capex repository for JSON storage
//!
//! Manages loading and saving capex records to capex.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LedgerError;
use crate::models::{Capex, CapexId, ProjectId, SupplierId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CapexData {
    capex: Vec<Capex>,
}

/// Repository for capex persistence
pub struct CapexRepository {
    path: PathBuf,
    data: RwLock<HashMap<CapexId, Capex>>,
}

impl CapexRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<CapexId, Capex>>, LedgerError> {
        self.data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CapexId, Capex>>, LedgerError> {
        self.data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: CapexData = read_json(&self.path)?;
        let mut data = self.write()?;
        data.clear();
        data.extend(file_data.capex.into_iter().map(|c| (c.id, c)));
        Ok(())
    }

    /// Save capex records to disk, newest first
    pub fn save(&self) -> Result<(), LedgerError> {
        let capex = sorted_newest_first(self.read()?.values().cloned().collect());
        write_json_atomic(&self.path, &CapexData { capex })
    }

    pub fn get(&self, id: CapexId) -> Result<Option<Capex>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All capex records, newest first
    pub fn get_all(&self) -> Result<Vec<Capex>, LedgerError> {
        Ok(sorted_newest_first(self.read()?.values().cloned().collect()))
    }

    /// Records pointing back at the given project
    pub fn get_by_project(&self, project_id: ProjectId) -> Result<Vec<Capex>, LedgerError> {
        let records = self
            .read()?
            .values()
            .filter(|c| c.project_id == Some(project_id))
            .cloned()
            .collect();
        Ok(sorted_newest_first(records))
    }

    pub fn get_by_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Capex>, LedgerError> {
        let records = self
            .read()?
            .values()
            .filter(|c| c.supplier_id == Some(supplier_id))
            .cloned()
            .collect();
        Ok(sorted_newest_first(records))
    }

    pub fn upsert(&self, capex: Capex) -> Result<(), LedgerError> {
        self.write()?.insert(capex.id, capex);
        Ok(())
    }

    pub fn delete(&self, id: CapexId) -> Result<Option<Capex>, LedgerError> {
        Ok(self.write()?.remove(&id))
    }

    pub fn exists(&self, id: CapexId) -> Result<bool, LedgerError> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }
}

fn sorted_newest_first(mut records: Vec<Capex>) -> Vec<Capex> {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CapexRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CapexRepository::new(temp_dir.path().join("capex.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn capex_on(day: u32) -> Capex {
        Capex::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            "hardware",
            Money::from_units(1_000),
            Money::from_units(900),
        )
    }

    #[test]
    fn test_get_all_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(capex_on(1)).unwrap();
        repo.upsert(capex_on(20)).unwrap();
        repo.upsert(capex_on(10)).unwrap();

        let days: Vec<_> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|c| c.date.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["20", "10", "01"]);
    }

    #[test]
    fn test_filters_by_project_and_supplier() {
        let (_temp_dir, repo) = create_test_repo();
        let project_id = ProjectId::new();
        let supplier_id = SupplierId::new();

        repo.upsert(capex_on(1).with_project(project_id)).unwrap();
        repo.upsert(capex_on(2).with_supplier(supplier_id)).unwrap();
        repo.upsert(capex_on(3)).unwrap();

        assert_eq!(repo.get_by_project(project_id).unwrap().len(), 1);
        assert_eq!(repo.get_by_supplier(supplier_id).unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let record = capex_on(5);
        let id = record.id;
        repo.upsert(record).unwrap();
        repo.save().unwrap();

        let reloaded = CapexRepository::new(temp_dir.path().join("capex.json"));
        reloaded.load().unwrap();
        assert!(reloaded.exists(id).unwrap());
        assert_eq!(reloaded.count().unwrap(), 1);
    }
}
