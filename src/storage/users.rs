//! User repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LedgerError;
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, User>>, LedgerError> {
        self.data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, User>>, LedgerError> {
        self.data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: UserData = read_json(&self.path)?;
        let mut data = self.write()?;
        data.clear();
        data.extend(file_data.users.into_iter().map(|u| (u.id, u)));
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let mut users: Vec<_> = self.read()?.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        write_json_atomic(&self.path, &UserData { users })
    }

    pub fn get(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All users, sorted by username
    pub fn get_all(&self) -> Result<Vec<User>, LedgerError> {
        let mut users: Vec<_> = self.read()?.values().cloned().collect();
        users.sort_by(|a, b| a.username.to_lowercase().cmp(&b.username.to_lowercase()));
        Ok(users)
    }

    /// Look a user up by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, LedgerError> {
        let email_lower = email.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .find(|u| u.email.to_lowercase() == email_lower)
            .cloned())
    }

    pub fn email_exists(&self, email: &str, exclude_id: Option<UserId>) -> Result<bool, LedgerError> {
        let email_lower = email.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .any(|u| u.email.to_lowercase() == email_lower && Some(u.id) != exclude_id))
    }

    pub fn upsert(&self, user: User) -> Result<(), LedgerError> {
        self.write()?.insert(user.id, user);
        Ok(())
    }

    pub fn delete(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        Ok(self.write()?.remove(&id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }
}
