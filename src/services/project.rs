//! Project service
//!
//! CRUD for projects plus their embedded opex entries, status history and
//! membership. Capex links are owned by `CapexService`; deleting a project
//! detaches its capex records instead of deleting them.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Opex, Project, ProjectId, UserId};
use crate::reports::{build_monthly_breakdown, MonthEnumeration, MonthlyBreakdownRow, ProjectSource};
use crate::storage::Storage;

use super::search::{rank, Page};

/// Fields for a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub estimated_start_date: NaiveDate,
    pub estimated_end_date: NaiveDate,
    pub forecasted_budget: Money,
    pub total_budget: Money,
    pub project_leader: Option<UserId>,
}

/// Partial update; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub estimated_start_date: Option<NaiveDate>,
    pub estimated_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub forecasted_budget: Option<Money>,
    pub total_budget: Option<Money>,
    pub project_leader: Option<UserId>,
}

/// A search hit together with its monthly breakdown
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSearchHit {
    #[serde(flatten)]
    pub project: Project,
    pub monthly_breakdown: Vec<MonthlyBreakdownRow>,
}

pub struct ProjectService<'a> {
    storage: &'a Storage,
}

impl<'a> ProjectService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require(&self, id: ProjectId) -> LedgerResult<Project> {
        self.storage
            .projects
            .get(id)?
            .ok_or_else(|| LedgerError::project_not_found(id.as_uuid().to_string()))
    }

    fn require_user(&self, id: UserId) -> LedgerResult<()> {
        match self.storage.users.get(id)? {
            Some(_) => Ok(()),
            None => Err(LedgerError::user_not_found(id.as_uuid().to_string())),
        }
    }

    /// Validate, store and log an edited project
    fn commit(&self, before: &Project, mut project: Project) -> LedgerResult<Project> {
        project.updated_at = Utc::now();
        project
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.projects.upsert(project.clone())?;
        self.storage.projects.save()?;

        self.storage.log_update(
            EntityType::Project,
            project.id.as_uuid().to_string(),
            Some(project.name.clone()),
            before,
            &project,
        )?;

        Ok(project)
    }

    pub fn create(&self, new: NewProject) -> LedgerResult<Project> {
        let name = new.name.trim();
        if self.storage.projects.name_exists(name, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Project",
                identifier: name.to_string(),
            });
        }
        if let Some(leader) = new.project_leader {
            self.require_user(leader)?;
        }

        let mut project = Project::new(
            name,
            new.description.trim(),
            new.estimated_start_date,
            new.estimated_end_date,
            new.forecasted_budget,
        );
        project.total_budget = new.total_budget;
        project.project_leader = new.project_leader;

        project
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.projects.upsert(project.clone())?;
        self.storage.projects.save()?;

        self.storage.log_create(
            EntityType::Project,
            project.id.as_uuid().to_string(),
            Some(project.name.clone()),
            &project,
        )?;
        tracing::info!(project = %project.name, "project created");

        Ok(project)
    }

    pub fn get(&self, id: ProjectId) -> LedgerResult<Option<Project>> {
        self.storage.projects.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> LedgerResult<Option<Project>> {
        self.storage.projects.get_by_name(name)
    }

    /// Find a project by name or ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Project>> {
        if let Some(project) = self.storage.projects.get_by_name(identifier)? {
            return Ok(Some(project));
        }
        match ProjectId::parse_opt(identifier) {
            Some(id) => self.storage.projects.get(id),
            None => Ok(None),
        }
    }

    /// Like `find`, but a missing project is an error
    pub fn resolve(&self, identifier: &str) -> LedgerResult<Project> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::project_not_found(identifier))
    }

    /// All projects, optionally filtered by a case-insensitive name fragment
    pub fn list(&self, name_filter: Option<&str>, limit: Option<usize>) -> LedgerResult<Vec<Project>> {
        let filter = name_filter.map(|f| f.trim().to_lowercase());
        Ok(self
            .storage
            .projects
            .get_all()?
            .into_iter()
            .filter(|p| match &filter {
                Some(f) => p.name.to_lowercase().contains(f),
                None => true,
            })
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    pub fn update(&self, id: ProjectId, update: ProjectUpdate) -> LedgerResult<Project> {
        let mut project = self.require(id)?;
        let before = project.clone();

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if self.storage.projects.name_exists(&name, Some(id))? {
                return Err(LedgerError::Duplicate {
                    entity_type: "Project",
                    identifier: name,
                });
            }
            project.name = name;
        }
        if let Some(leader) = update.project_leader {
            self.require_user(leader)?;
            project.project_leader = Some(leader);
        }
        if let Some(description) = update.description {
            project.description = description.trim().to_string();
        }
        if let Some(date) = update.estimated_start_date {
            project.estimated_start_date = Some(date);
        }
        if let Some(date) = update.estimated_end_date {
            project.estimated_end_date = Some(date);
        }
        if let Some(date) = update.actual_start_date {
            project.actual_start_date = Some(date);
        }
        if let Some(date) = update.actual_end_date {
            project.actual_end_date = Some(date);
        }
        if let Some(amount) = update.forecasted_budget {
            project.forecasted_budget = amount;
        }
        if let Some(amount) = update.total_budget {
            project.total_budget = amount;
        }

        self.commit(&before, project)
    }

    /// Delete a project and clear the back-reference on its capex records
    pub fn delete(&self, id: ProjectId) -> LedgerResult<Project> {
        let project = self.require(id)?;

        let linked = self.storage.capex.get_by_project(id)?;
        for mut capex in linked.iter().cloned() {
            capex.project_id = None;
            capex.updated_at = Utc::now();
            self.storage.capex.upsert(capex)?;
        }
        if !linked.is_empty() {
            self.storage.capex.save()?;
        }

        self.storage.projects.delete(id)?;
        self.storage.projects.save()?;

        self.storage.log_delete(
            EntityType::Project,
            id.as_uuid().to_string(),
            Some(project.name.clone()),
            &project,
        )?;
        tracing::info!(
            project = %project.name,
            detached = linked.len(),
            "project deleted"
        );

        Ok(project)
    }

    /// Text search over name and description, each hit with its breakdown
    pub fn search(
        &self,
        query: &str,
        limit: usize,
        enumeration: MonthEnumeration,
    ) -> LedgerResult<Vec<ProjectSearchHit>> {
        let hits = rank(self.storage.projects.get_all()?, query, Some(limit), |p| {
            vec![p.name.as_str(), p.description.as_str()]
        });

        hits.into_iter()
            .map(|project| {
                let capex = self.storage.capex_by_ids(&project.capex_expenditures)?;
                let monthly_breakdown = build_monthly_breakdown(&project, &capex, enumeration)?;
                Ok(ProjectSearchHit {
                    project,
                    monthly_breakdown,
                })
            })
            .collect()
    }

    /// Projects a user leads or belongs to, one page at a time
    pub fn by_member(&self, user_id: UserId, page: usize, page_size: usize) -> LedgerResult<Page<Project>> {
        let projects = self.storage.projects.get_by_member(user_id)?;
        Ok(Page::paginate(projects, page, page_size))
    }

    pub fn add_opex(&self, id: ProjectId, opex: Opex) -> LedgerResult<Project> {
        let mut project = self.require(id)?;
        let before = project.clone();
        project.add_opex(opex);
        self.commit(&before, project)
    }

    /// Remove the opex entry at a 0-based position
    pub fn remove_opex(&self, id: ProjectId, index: usize) -> LedgerResult<(Project, Opex)> {
        let mut project = self.require(id)?;
        let before = project.clone();
        let removed = project.remove_opex(index).ok_or_else(|| {
            LedgerError::Validation(format!(
                "Project '{}' has no opex entry #{}",
                project.name, index
            ))
        })?;
        Ok((self.commit(&before, project)?, removed))
    }

    pub fn record_status(&self, id: ProjectId, status: &str, date: NaiveDate) -> LedgerResult<Project> {
        let status = status.trim();
        if status.is_empty() {
            return Err(LedgerError::Validation("Status cannot be empty".into()));
        }
        let mut project = self.require(id)?;
        let before = project.clone();
        project.record_status(status, date);
        self.commit(&before, project)
    }

    pub fn add_member(&self, id: ProjectId, user_id: UserId, role: &str) -> LedgerResult<Project> {
        self.require_user(user_id)?;
        let mut project = self.require(id)?;
        let before = project.clone();
        project.upsert_member(user_id, role.trim());
        self.commit(&before, project)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        self.storage.projects.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Capex, User};
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

    fn new_project(name: &str, description: &str) -> NewProject {
        NewProject {
            name: name.into(),
            description: description.into(),
            estimated_start_date: date(2024, 1, 1),
            estimated_end_date: date(2024, 3, 31),
            forecasted_budget: Money::from_units(900_000),
            total_budget: Money::from_units(1_000_000),
            project_leader: None,
        }
    }

    #[test]
    fn test_create_and_duplicate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);

        let project = service.create(new_project("Apollo", "refit")).unwrap();
        assert_eq!(service.count().unwrap(), 1);
        assert_eq!(service.find("apollo").unwrap().unwrap().id, project.id);
        assert_eq!(
            service.find(&project.id.as_uuid().to_string()).unwrap().unwrap().id,
            project.id
        );

        let err = service.create(new_project("APOLLO", "again")).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);

        let mut inverted = new_project("Inverted", "dates");
        inverted.estimated_end_date = date(2023, 1, 1);
        assert!(service.create(inverted).unwrap_err().is_validation());

        let mut negative = new_project("Negative", "budget");
        negative.forecasted_budget = Money::from_cents(-1);
        assert!(service.create(negative).unwrap_err().is_validation());

        let mut unknown_leader = new_project("Led", "by nobody");
        unknown_leader.project_leader = Some(UserId::new());
        assert!(service.create(unknown_leader).unwrap_err().is_not_found());

        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_partial_update() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = service.create(new_project("Apollo", "refit")).unwrap();
        service.create(new_project("Gemini", "other")).unwrap();

        let updated = service
            .update(
                project.id,
                ProjectUpdate {
                    forecasted_budget: Some(Money::from_units(1_200_000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.forecasted_budget, Money::from_units(1_200_000));
        assert_eq!(updated.description, "refit");

        let clash = service.update(
            project.id,
            ProjectUpdate {
                name: Some("gemini".into()),
                ..Default::default()
            },
        );
        assert!(matches!(clash, Err(LedgerError::Duplicate { .. })));

        let entries = storage.audit().read_all().unwrap();
        let last_update = entries
            .iter()
            .rev()
            .find(|e| e.operation == Operation::Update)
            .unwrap();
        assert!(last_update
            .diff_summary
            .as_deref()
            .unwrap()
            .contains("forecastedBudget"));
    }

    #[test]
    fn test_delete_detaches_capex() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let mut project = service.create(new_project("Apollo", "refit")).unwrap();

        let capex = Capex::new(
            date(2024, 2, 1),
            "hardware",
            Money::from_units(10),
            Money::from_units(10),
        )
        .with_project(project.id);
        project.link_capex(capex.id);
        storage.capex.upsert(capex.clone()).unwrap();
        storage.projects.upsert(project.clone()).unwrap();

        service.delete(project.id).unwrap();

        assert!(service.get(project.id).unwrap().is_none());
        let detached = storage.capex.get(capex.id).unwrap().unwrap();
        assert!(detached.project_id.is_none());
    }

    #[test]
    fn test_search_enriches_with_breakdown() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        service
            .create(new_project("Solar Farm", "photovoltaic array"))
            .unwrap();
        service.create(new_project("Wind Farm", "turbines")).unwrap();
        service.create(new_project("Roads", "asphalt")).unwrap();

        let hits = service
            .search("solar farm", 20, MonthEnumeration::StartYear)
            .unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.project.name.as_str()).collect();
        assert_eq!(names, vec!["Solar Farm", "Wind Farm"]);
        assert_eq!(hits[0].monthly_breakdown.len(), 3);

        let limited = service.search("farm", 1, MonthEnumeration::StartYear).unwrap();
        assert_eq!(limited.len(), 1);

        let json = serde_json::to_value(&hits[0]).unwrap();
        assert_eq!(json["name"], "Solar Farm");
        assert!(json["monthlyBreakdown"].is_array());
    }

    #[test]
    fn test_opex_status_and_members() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        let project = service.create(new_project("Apollo", "refit")).unwrap();

        let user = User::new("jdoe", "Jane", "Doe", "jane@example.com", "hash");
        storage.users.upsert(user.clone()).unwrap();

        service
            .add_opex(
                project.id,
                Opex::new(
                    date(2024, 2, 10),
                    "Ada",
                    "Engineer",
                    Money::from_units(50_000),
                    Money::from_units(45_000),
                ),
            )
            .unwrap();
        let (after, removed) = service.remove_opex(project.id, 0).unwrap();
        assert_eq!(removed.person_name, "Ada");
        assert!(after.opex_expenditures.is_empty());
        assert!(service.remove_opex(project.id, 0).unwrap_err().is_validation());

        service
            .record_status(project.id, "active", date(2024, 1, 2))
            .unwrap();
        let with_member = service.add_member(project.id, user.id, "analyst").unwrap();
        assert_eq!(with_member.project_status.len(), 1);
        assert!(with_member.has_member(user.id));

        assert!(service
            .add_member(project.id, UserId::new(), "ghost")
            .unwrap_err()
            .is_not_found());

        let page = service.by_member(user.id, 1, 10).unwrap();
        assert_eq!(page.total_results, 1);
        assert!(!page.has_more);
    }

    #[test]
    fn test_list_with_filter_and_limit() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ProjectService::new(&storage);
        for name in ["Alpha", "Beta", "Alphabet"] {
            service.create(new_project(name, "x")).unwrap();
        }

        assert_eq!(service.list(None, None).unwrap().len(), 3);
        assert_eq!(service.list(Some("ALPHA"), None).unwrap().len(), 2);
        assert_eq!(service.list(None, Some(1)).unwrap()[0].name, "Alpha");
    }
}
