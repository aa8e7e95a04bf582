//! Project repository for JSON storage
//!
//! Manages loading and saving projects to projects.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LedgerError;
use crate::models::{Project, ProjectId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProjectData {
    projects: Vec<Project>,
}

/// Repository for project persistence
pub struct ProjectRepository {
    path: PathBuf,
    data: RwLock<HashMap<ProjectId, Project>>,
}

impl ProjectRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<ProjectId, Project>>, LedgerError> {
        self.data
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<ProjectId, Project>>, LedgerError> {
        self.data
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load projects from disk, replacing whatever is in memory
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ProjectData = read_json(&self.path)?;
        let mut data = self.write()?;
        data.clear();
        data.extend(file_data.projects.into_iter().map(|p| (p.id, p)));
        Ok(())
    }

    /// Save projects to disk, ordered by creation time
    pub fn save(&self) -> Result<(), LedgerError> {
        let mut projects: Vec<_> = self.read()?.values().cloned().collect();
        projects.sort_by_key(|p| p.created_at);
        write_json_atomic(&self.path, &ProjectData { projects })
    }

    pub fn get(&self, id: ProjectId) -> Result<Option<Project>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All projects, sorted by name
    pub fn get_all(&self) -> Result<Vec<Project>, LedgerError> {
        let mut projects: Vec<_> = self.read()?.values().cloned().collect();
        projects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(projects)
    }

    /// Look a project up by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Project>, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .find(|p| p.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Projects the user leads or is a member of, sorted by name
    pub fn get_by_member(&self, user_id: UserId) -> Result<Vec<Project>, LedgerError> {
        let mut projects: Vec<_> = self
            .read()?
            .values()
            .filter(|p| p.project_leader == Some(user_id) || p.has_member(user_id))
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(projects)
    }

    pub fn upsert(&self, project: Project) -> Result<(), LedgerError> {
        self.write()?.insert(project.id, project);
        Ok(())
    }

    /// Remove a project, returning it if it existed
    pub fn delete(&self, id: ProjectId) -> Result<Option<Project>, LedgerError> {
        Ok(self.write()?.remove(&id))
    }

    pub fn exists(&self, id: ProjectId) -> Result<bool, LedgerError> {
        Ok(self.read()?.contains_key(&id))
    }

    /// Check whether another project already uses this name
    pub fn name_exists(&self, name: &str, exclude_id: Option<ProjectId>) -> Result<bool, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .any(|p| p.name.to_lowercase() == name_lower && Some(p.id) != exclude_id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }
}
