//! Supplier model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{SupplierId, UserId};

/// A vendor that capex records can be attributed to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,

    pub name: String,

    #[serde(default)]
    pub address: String,

    /// Users acting as contacts for this supplier
    #[serde(default)]
    pub contact_persons: Vec<UserId>,

    #[serde(default)]
    pub logo: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SupplierId::new(),
            name: name.into(),
            address: address.into(),
            contact_persons: Vec::new(),
            logo: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a contact person; no-op when already listed
    pub fn add_contact(&mut self, user_id: UserId) {
        if !self.contact_persons.contains(&user_id) {
            self.contact_persons.push(user_id);
            self.updated_at = Utc::now();
        }
    }

    pub fn validate(&self) -> Result<(), SupplierValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SupplierValidationError::EmptyName);
        }
        if name.len() > 255 {
            return Err(SupplierValidationError::NameTooLong(name.len()));
        }
        Ok(())
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplierValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for SupplierValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Supplier name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Supplier name too long ({} chars, max 255)", len)
            }
        }
    }
}

impl std::error::Error for SupplierValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_supplier() {
        let supplier = Supplier::new("Acme Corp", "1 Main St");
        assert_eq!(supplier.name, "Acme Corp");
        assert!(supplier.contact_persons.is_empty());
        assert!(supplier.validate().is_ok());
    }

    #[test]
    fn test_contacts_are_unique() {
        let mut supplier = Supplier::new("Acme Corp", "");
        let user = UserId::new();
        supplier.add_contact(user);
        supplier.add_contact(user);
        assert_eq!(supplier.contact_persons, vec![user]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let supplier = Supplier::new("   ", "");
        assert_eq!(
            supplier.validate(),
            Err(SupplierValidationError::EmptyName)
        );
    }
}
