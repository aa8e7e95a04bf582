//! Supplier service

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Supplier, SupplierId, UserId};
use crate::storage::Storage;

use super::search::{rank, Page};

#[derive(Debug, Clone, Default)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
}

pub struct SupplierService<'a> {
    storage: &'a Storage,
}

impl<'a> SupplierService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require(&self, id: SupplierId) -> LedgerResult<Supplier> {
        self.storage
            .suppliers
            .get(id)?
            .ok_or_else(|| LedgerError::supplier_not_found(id.as_uuid().to_string()))
    }

    fn ensure_unique(&self, name: &str, exclude: Option<SupplierId>) -> LedgerResult<()> {
        if self.storage.suppliers.name_exists(name, exclude)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Supplier",
                identifier: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn create(&self, name: &str, address: &str, logo: Option<String>) -> LedgerResult<Supplier> {
        let name = name.trim();
        self.ensure_unique(name, None)?;

        let mut supplier = Supplier::new(name, address.trim());
        supplier.logo = logo;
        supplier
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.suppliers.upsert(supplier.clone())?;
        self.storage.suppliers.save()?;

        self.storage.log_create(
            EntityType::Supplier,
            supplier.id.as_uuid().to_string(),
            Some(supplier.name.clone()),
            &supplier,
        )?;

        Ok(supplier)
    }

    pub fn get(&self, id: SupplierId) -> LedgerResult<Option<Supplier>> {
        self.storage.suppliers.get(id)
    }

    /// Find a supplier by name or ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Supplier>> {
        if let Some(supplier) = self.storage.suppliers.get_by_name(identifier)? {
            return Ok(Some(supplier));
        }
        match SupplierId::parse_opt(identifier) {
            Some(id) => self.storage.suppliers.get(id),
            None => Ok(None),
        }
    }

    pub fn resolve(&self, identifier: &str) -> LedgerResult<Supplier> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::supplier_not_found(identifier))
    }

    pub fn list(&self) -> LedgerResult<Vec<Supplier>> {
        self.storage.suppliers.get_all()
    }

    pub fn list_page(&self, page: usize, page_size: usize) -> LedgerResult<Page<Supplier>> {
        Ok(Page::paginate(self.list()?, page, page_size))
    }

    pub fn update(&self, id: SupplierId, update: SupplierUpdate) -> LedgerResult<Supplier> {
        let mut supplier = self.require(id)?;
        let before = supplier.clone();

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            self.ensure_unique(&name, Some(id))?;
            supplier.name = name;
        }
        if let Some(address) = update.address {
            supplier.address = address.trim().to_string();
        }
        if let Some(logo) = update.logo {
            supplier.logo = Some(logo);
        }
        supplier.updated_at = Utc::now();

        supplier
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.suppliers.upsert(supplier.clone())?;
        self.storage.suppliers.save()?;

        self.storage.log_update(
            EntityType::Supplier,
            id.as_uuid().to_string(),
            Some(supplier.name.clone()),
            &before,
            &supplier,
        )?;

        Ok(supplier)
    }

    pub fn add_contact(&self, id: SupplierId, user_id: UserId) -> LedgerResult<Supplier> {
        if self.storage.users.get(user_id)?.is_none() {
            return Err(LedgerError::user_not_found(user_id.as_uuid().to_string()));
        }
        let mut supplier = self.require(id)?;
        let before = supplier.clone();
        supplier.add_contact(user_id);

        self.storage.suppliers.upsert(supplier.clone())?;
        self.storage.suppliers.save()?;

        self.storage.log_update(
            EntityType::Supplier,
            id.as_uuid().to_string(),
            Some(supplier.name.clone()),
            &before,
            &supplier,
        )?;

        Ok(supplier)
    }

    /// Delete a supplier; capex records keep their (now dangling) supplier id
    pub fn delete(&self, id: SupplierId) -> LedgerResult<Supplier> {
        let supplier = self.require(id)?;

        self.storage.suppliers.delete(id)?;
        self.storage.suppliers.save()?;

        self.storage.log_delete(
            EntityType::Supplier,
            id.as_uuid().to_string(),
            Some(supplier.name.clone()),
            &supplier,
        )?;

        Ok(supplier)
    }

    /// Text search over name and address
    pub fn search(&self, query: &str, page: usize, page_size: usize) -> LedgerResult<Page<Supplier>> {
        let hits = rank(self.list()?, query, None, |s| {
            vec![s.name.as_str(), s.address.as_str()]
        });
        Ok(Page::paginate(hits, page, page_size))
    }
}
