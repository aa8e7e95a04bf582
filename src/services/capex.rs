//! Capex service
//!
//! The only write path for capex records. Every change that touches a capex
//! record's `project_id` also updates the owning project's
//! `capex_expenditures` list, so the two always agree:
//!
//! 1. write the capex record (memory, then `capex.json`)
//! 2. write the affected project(s) (memory, then `projects.json`)
//!
//! If step 2 fails, step 1 is reverted before the error is returned.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Capex, CapexId, Money, Project, ProjectId, SupplierId};
use crate::storage::Storage;

use super::search::{rank, Page};

#[derive(Debug, Clone)]
pub struct NewCapex {
    pub date: NaiveDate,
    pub capex_type: String,
    pub description: String,
    pub estimated_amount: Money,
    pub actual_amount: Money,
    pub status: Option<String>,
    pub supplier_id: Option<SupplierId>,
    pub project_id: Option<ProjectId>,
}

/// What an update does to the project link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectLink {
    #[default]
    Keep,
    Assign(ProjectId),
    Detach,
}

#[derive(Debug, Clone, Default)]
pub struct CapexUpdate {
    pub date: Option<NaiveDate>,
    pub capex_type: Option<String>,
    pub description: Option<String>,
    pub estimated_amount: Option<Money>,
    pub actual_amount: Option<Money>,
    pub status: Option<String>,
    pub supplier_id: Option<SupplierId>,
    pub project: ProjectLink,
}

pub struct CapexService<'a> {
    storage: &'a Storage,
}

impl<'a> CapexService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require(&self, id: CapexId) -> LedgerResult<Capex> {
        self.storage
            .capex
            .get(id)?
            .ok_or_else(|| LedgerError::capex_not_found(id.as_uuid().to_string()))
    }

    fn require_project(&self, id: ProjectId) -> LedgerResult<Project> {
        self.storage
            .projects
            .get(id)?
            .ok_or_else(|| LedgerError::project_not_found(id.as_uuid().to_string()))
    }

    fn require_supplier(&self, id: SupplierId) -> LedgerResult<()> {
        if self.storage.suppliers.exists(id)? {
            Ok(())
        } else {
            Err(LedgerError::supplier_not_found(id.as_uuid().to_string()))
        }
    }

    /// Apply project edits and persist them; on failure restore the given
    /// originals in memory
    fn write_projects(&self, edited: Vec<Project>, originals: &[Project]) -> LedgerResult<()> {
        if edited.is_empty() {
            return Ok(());
        }
        let result = edited
            .into_iter()
            .try_for_each(|p| self.storage.projects.upsert(p))
            .and_then(|_| self.storage.projects.save());

        if result.is_err() {
            for original in originals {
                // best effort; the first error is the one reported
                let _ = self.storage.projects.upsert(original.clone());
            }
        }
        result
    }

    /// Put the capex store back to `previous` (or remove `id` if there was none)
    fn revert_capex(&self, id: CapexId, previous: Option<Capex>) {
        let reverted = match previous {
            Some(capex) => self.storage.capex.upsert(capex),
            None => self.storage.capex.delete(id).map(|_| ()),
        }
        .and_then(|_| self.storage.capex.save());

        if let Err(e) = reverted {
            tracing::error!(capex = %id.as_uuid(), error = %e, "capex rollback failed");
        } else {
            tracing::warn!(capex = %id.as_uuid(), "capex change rolled back");
        }
    }

    pub fn create(&self, new: NewCapex) -> LedgerResult<Capex> {
        let project = match new.project_id {
            Some(id) => Some(self.require_project(id)?),
            None => None,
        };
        if let Some(supplier_id) = new.supplier_id {
            self.require_supplier(supplier_id)?;
        }

        let mut capex = Capex::new(
            new.date,
            new.capex_type.trim(),
            new.estimated_amount,
            new.actual_amount,
        )
        .with_description(new.description.trim());
        if let Some(status) = new.status {
            capex.status = status.trim().to_string();
        }
        capex.supplier_id = new.supplier_id;
        capex.project_id = new.project_id;

        capex
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.capex.upsert(capex.clone())?;
        self.storage.capex.save()?;

        if let Some(original) = project {
            let mut linked = original.clone();
            linked.link_capex(capex.id);
            if let Err(e) = self.write_projects(vec![linked], &[original]) {
                self.revert_capex(capex.id, None);
                return Err(e);
            }
        }

        self.storage.log_create(
            EntityType::Capex,
            capex.id.as_uuid().to_string(),
            Some(capex.capex_type.clone()),
            &capex,
        )?;

        Ok(capex)
    }

    pub fn get(&self, id: CapexId) -> LedgerResult<Option<Capex>> {
        self.storage.capex.get(id)
    }

    /// Find a record by full ID or by the short `cpx-xxxxxxxx` form shown in lists
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Capex>> {
        if let Some(id) = CapexId::parse_opt(identifier) {
            return self.storage.capex.get(id);
        }

        let prefix = identifier.trim();
        let prefix = prefix.strip_prefix("cpx-").unwrap_or(prefix).to_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }

        let mut matches = self
            .storage
            .capex
            .get_all()?
            .into_iter()
            .filter(|c| c.id.as_uuid().to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(_), Some(_)) => Err(LedgerError::Validation(format!(
                "'{}' matches more than one capex record; use the full ID",
                identifier
            ))),
            (found, _) => Ok(found),
        }
    }

    pub fn resolve(&self, identifier: &str) -> LedgerResult<Capex> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::capex_not_found(identifier))
    }

    /// All capex records, newest first
    pub fn list(&self) -> LedgerResult<Vec<Capex>> {
        self.storage.capex.get_all()
    }

    pub fn list_by_project(&self, project_id: ProjectId) -> LedgerResult<Vec<Capex>> {
        self.storage.capex.get_by_project(project_id)
    }

    pub fn update(&self, id: CapexId, update: CapexUpdate) -> LedgerResult<Capex> {
        let previous = self.require(id)?;
        let mut capex = previous.clone();

        if let Some(date) = update.date {
            capex.date = date;
        }
        if let Some(capex_type) = update.capex_type {
            capex.capex_type = capex_type.trim().to_string();
        }
        if let Some(description) = update.description {
            capex.description = description.trim().to_string();
        }
        if let Some(amount) = update.estimated_amount {
            capex.estimated_amount = amount;
        }
        if let Some(amount) = update.actual_amount {
            capex.actual_amount = amount;
        }
        if let Some(status) = update.status {
            capex.status = status.trim().to_string();
        }
        if let Some(supplier_id) = update.supplier_id {
            self.require_supplier(supplier_id)?;
            capex.supplier_id = Some(supplier_id);
        }

        let old_project = previous.project_id;
        let new_project = match update.project {
            ProjectLink::Keep => old_project,
            ProjectLink::Assign(project_id) => Some(project_id),
            ProjectLink::Detach => None,
        };
        capex.project_id = new_project;
        capex.updated_at = Utc::now();

        capex
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        // Gather project edits before writing anything
        let mut originals = Vec::new();
        let mut edited = Vec::new();
        if old_project != new_project {
            if let Some(old_id) = old_project {
                // The old project may be gone already; nothing to unlink then
                if let Some(original) = self.storage.projects.get(old_id)? {
                    let mut unlinked = original.clone();
                    unlinked.unlink_capex(id);
                    originals.push(original);
                    edited.push(unlinked);
                }
            }
            if let Some(new_id) = new_project {
                let original = self.require_project(new_id)?;
                let mut linked = original.clone();
                linked.link_capex(id);
                originals.push(original);
                edited.push(linked);
            }
        }

        self.storage.capex.upsert(capex.clone())?;
        self.storage.capex.save()?;

        if let Err(e) = self.write_projects(edited, &originals) {
            self.revert_capex(id, Some(previous));
            return Err(e);
        }

        self.storage.log_update(
            EntityType::Capex,
            id.as_uuid().to_string(),
            Some(capex.capex_type.clone()),
            &previous,
            &capex,
        )?;

        Ok(capex)
    }

    pub fn delete(&self, id: CapexId) -> LedgerResult<Capex> {
        let capex = self.require(id)?;

        let project = match capex.project_id {
            Some(project_id) => self.storage.projects.get(project_id)?,
            None => None,
        };

        self.storage.capex.delete(id)?;
        self.storage.capex.save()?;

        if let Some(original) = project {
            let mut unlinked = original.clone();
            unlinked.unlink_capex(id);
            if let Err(e) = self.write_projects(vec![unlinked], &[original]) {
                self.revert_capex(id, Some(capex));
                return Err(e);
            }
        }

        self.storage.log_delete(
            EntityType::Capex,
            id.as_uuid().to_string(),
            Some(capex.capex_type.clone()),
            &capex,
        )?;

        Ok(capex)
    }

    /// Search capex records, one page at a time
    ///
    /// A query that parses as an ID matches records whose supplier or project
    /// has that ID; anything else is a text search over type and description.
    pub fn search(&self, query: &str, page: usize, page_size: usize) -> LedgerResult<Page<Capex>> {
        let all = self.storage.capex.get_all()?;
        let query = query.trim();

        let matches = match uuid::Uuid::parse_str(query) {
            Ok(uuid) => {
                let supplier = SupplierId::from(uuid);
                let project = ProjectId::from(uuid);
                all.into_iter()
                    .filter(|c| c.supplier_id == Some(supplier) || c.project_id == Some(project))
                    .collect()
            }
            Err(_) => rank(all, query, None, |c| {
                vec![c.capex_type.as_str(), c.description.as_str()]
            }),
        };

        Ok(Page::paginate(matches, page, page_size))
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.capex.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Supplier;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn add_project(storage: &Storage, name: &str) -> Project {
        let project = Project::new(
            name,
            "test",
            date(2024, 1, 1),
            date(2024, 12, 31),
            Money::from_units(120_000),
        );
        storage.projects.upsert(project.clone()).unwrap();
        project
    }

    fn new_capex(project_id: Option<ProjectId>) -> NewCapex {
        NewCapex {
            date: date(2024, 4, 2),
            capex_type: "hardware".into(),
            description: "rack servers".into(),
            estimated_amount: Money::from_units(20_000),
            actual_amount: Money::from_units(18_000),
            status: None,
            supplier_id: None,
            project_id,
        }
    }

    fn linked_ids(storage: &Storage, project_id: ProjectId) -> Vec<CapexId> {
        storage
            .projects
            .get(project_id)
            .unwrap()
            .unwrap()
            .capex_expenditures
    }

    #[test]
    fn test_create_links_project() {
        let (_temp_dir, storage) = create_test_storage();
        let project = add_project(&storage, "Apollo");
        let service = CapexService::new(&storage);

        let capex = service.create(new_capex(Some(project.id))).unwrap();

        assert_eq!(capex.status, "pending");
        assert_eq!(capex.project_id, Some(project.id));
        assert_eq!(linked_ids(&storage, project.id), vec![capex.id]);
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CapexService::new(&storage);
        let capex = service.create(new_capex(None)).unwrap();

        let short = capex.id.to_string();
        assert!(short.starts_with("cpx-"));
        assert_eq!(service.resolve(&short).unwrap().id, capex.id);
        assert_eq!(
            service.find(&capex.id.as_uuid().to_string()).unwrap().unwrap().id,
            capex.id
        );
        assert!(service.resolve("cpx-zzzz").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CapexService::new(&storage);

        let mut zero = new_capex(None);
        zero.actual_amount = Money::zero();
        assert!(service.create(zero).unwrap_err().is_validation());

        assert!(service
            .create(new_capex(Some(ProjectId::new())))
            .unwrap_err()
            .is_not_found());

        let mut unknown_supplier = new_capex(None);
        unknown_supplier.supplier_id = Some(SupplierId::new());
        assert!(service.create(unknown_supplier).unwrap_err().is_not_found());

        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_reassign_and_detach() {
        let (_temp_dir, storage) = create_test_storage();
        let first = add_project(&storage, "First");
        let second = add_project(&storage, "Second");
        let service = CapexService::new(&storage);
        let capex = service.create(new_capex(Some(first.id))).unwrap();

        let moved = service
            .update(
                capex.id,
                CapexUpdate {
                    project: ProjectLink::Assign(second.id),
                    status: Some("approved".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.project_id, Some(second.id));
        assert_eq!(moved.status, "approved");
        assert!(linked_ids(&storage, first.id).is_empty());
        assert_eq!(linked_ids(&storage, second.id), vec![capex.id]);

        let detached = service
            .update(
                capex.id,
                CapexUpdate {
                    project: ProjectLink::Detach,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(detached.project_id.is_none());
        assert!(linked_ids(&storage, second.id).is_empty());
    }

    #[test]
    fn test_delete_unlinks_project() {
        let (_temp_dir, storage) = create_test_storage();
        let project = add_project(&storage, "Apollo");
        let service = CapexService::new(&storage);
        let capex = service.create(new_capex(Some(project.id))).unwrap();

        service.delete(capex.id).unwrap();

        assert!(service.get(capex.id).unwrap().is_none());
        assert!(linked_ids(&storage, project.id).is_empty());
        assert!(service.delete(capex.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_rolls_back_when_project_write_fails() {
        let (temp_dir, storage) = create_test_storage();
        let project = add_project(&storage, "Apollo");
        // A directory where projects.json should go makes the project save fail
        std::fs::create_dir_all(temp_dir.path().join("data").join("projects.json")).unwrap();

        let service = CapexService::new(&storage);
        let result = service.create(new_capex(Some(project.id)));

        assert!(matches!(result, Err(LedgerError::Storage(_))));
        assert_eq!(service.count().unwrap(), 0);
        assert!(linked_ids(&storage, project.id).is_empty());

        storage.capex.load().unwrap();
        assert_eq!(storage.capex.count().unwrap(), 0);
    }

    #[test]
    fn test_search_by_id_and_text() {
        let (_temp_dir, storage) = create_test_storage();
        let project = add_project(&storage, "Apollo");
        let supplier = Supplier::new("Acme", "");
        storage.suppliers.upsert(supplier.clone()).unwrap();
        let service = CapexService::new(&storage);

        service.create(new_capex(Some(project.id))).unwrap();
        let mut licence = new_capex(None);
        licence.capex_type = "licence".into();
        licence.description = "database seats".into();
        licence.supplier_id = Some(supplier.id);
        service.create(licence).unwrap();

        let by_project = service
            .search(&project.id.as_uuid().to_string(), 1, 10)
            .unwrap();
        assert_eq!(by_project.total_results, 1);
        assert_eq!(by_project.results[0].capex_type, "hardware");

        let by_supplier = service
            .search(&supplier.id.as_uuid().to_string(), 1, 10)
            .unwrap();
        assert_eq!(by_supplier.results[0].capex_type, "licence");

        let text = service.search("database", 1, 10).unwrap();
        assert_eq!(text.total_results, 1);
        assert_eq!(text.current_page, 1);
        assert!(!text.has_more);
    }
}
