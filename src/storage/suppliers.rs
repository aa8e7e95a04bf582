//! Supplier repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LedgerError;
use crate::models::{Supplier, SupplierId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SupplierData {
    suppliers: Vec<Supplier>,
}

pub struct SupplierRepository {
    path: PathBuf,
    data: RwLock<HashMap<SupplierId, Supplier>>,
}

impl SupplierRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<SupplierId, Supplier>>, LedgerError> {
        self.data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<SupplierId, Supplier>>, LedgerError> {
        self.data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: SupplierData = read_json(&self.path)?;
        let mut data = self.write()?;
        data.clear();
        data.extend(file_data.suppliers.into_iter().map(|s| (s.id, s)));
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let suppliers = self.get_all()?;
        write_json_atomic(&self.path, &SupplierData { suppliers })
    }

    pub fn get(&self, id: SupplierId) -> Result<Option<Supplier>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All suppliers, sorted by name
    pub fn get_all(&self) -> Result<Vec<Supplier>, LedgerError> {
        let mut suppliers: Vec<_> = self.read()?.values().cloned().collect();
        suppliers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(suppliers)
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Supplier>, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .find(|s| s.name.to_lowercase() == name_lower)
            .cloned())
    }

    pub fn upsert(&self, supplier: Supplier) -> Result<(), LedgerError> {
        self.write()?.insert(supplier.id, supplier);
        Ok(())
    }

    pub fn delete(&self, id: SupplierId) -> Result<Option<Supplier>, LedgerError> {
        Ok(self.write()?.remove(&id))
    }

    pub fn exists(&self, id: SupplierId) -> Result<bool, LedgerError> {
        Ok(self.read()?.contains_key(&id))
    }

    pub fn name_exists(&self, name: &str, exclude_id: Option<SupplierId>) -> Result<bool, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .any(|s| s.name.to_lowercase() == name_lower && Some(s.id) != exclude_id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_upsert_get_and_sort() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SupplierRepository::new(temp_dir.path().join("suppliers.json"));
        repo.load().unwrap();

        repo.upsert(Supplier::new("zeta parts", "")).unwrap();
        repo.upsert(Supplier::new("Acme", "")).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Acme", "zeta parts"]);
        assert!(repo.get_by_name("ACME").unwrap().is_some());
        assert!(repo.name_exists("Zeta Parts", None).unwrap());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("suppliers.json");
        let repo = SupplierRepository::new(path.clone());
        let supplier = Supplier::new("Acme", "1 Main St");
        let id = supplier.id;
        repo.upsert(supplier).unwrap();
        repo.save().unwrap();

        let reloaded = SupplierRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(id).unwrap().unwrap().address, "1 Main St");
    }
}
