//! Project model
//!
//! A project owns its opex entries outright and refers to capex records by id.
//! The estimated date range and forecasted budget drive the monthly breakdown.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CapexId, ProjectId, UserId};
use super::money::Money;

/// Operational expenditure recorded inline on a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opex {
    pub date: NaiveDate,
    pub estimated_amount: Money,
    pub actual_amount: Money,
    pub person_name: String,
    pub role: String,
}

impl Opex {
    pub fn new(
        date: NaiveDate,
        person_name: impl Into<String>,
        role: impl Into<String>,
        estimated_amount: Money,
        actual_amount: Money,
    ) -> Self {
        Self {
            date,
            estimated_amount,
            actual_amount,
            person_name: person_name.into(),
            role: role.into(),
        }
    }
}

/// One entry in a project's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: String,
    pub date: NaiveDate,
}

/// A user participating in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: UserId,
    pub role: String,
}

/// A tracked project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,

    /// Human-readable name, unique (case-insensitive) across projects
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Required on create; optional here so records missing them still load
    /// and surface as a validation error when a breakdown is requested
    #[serde(default)]
    pub estimated_start_date: Option<NaiveDate>,

    #[serde(default)]
    pub estimated_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,

    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub total_budget: Money,

    #[serde(default)]
    pub forecasted_budget: Money,

    #[serde(default)]
    pub opex_expenditures: Vec<Opex>,

    /// Capex records linked to this project (each links back via `projectId`)
    #[serde(default)]
    pub capex_expenditures: Vec<CapexId>,

    #[serde(default)]
    pub project_status: Vec<StatusEntry>,

    #[serde(default)]
    pub project_leader: Option<UserId>,

    #[serde(default)]
    pub members: Vec<Member>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project over an estimated date range
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        estimated_start_date: NaiveDate,
        estimated_end_date: NaiveDate,
        forecasted_budget: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description: description.into(),
            estimated_start_date: Some(estimated_start_date),
            estimated_end_date: Some(estimated_end_date),
            actual_start_date: None,
            actual_end_date: None,
            total_budget: Money::zero(),
            forecasted_budget,
            opex_expenditures: Vec::new(),
            capex_expenditures: Vec::new(),
            project_status: Vec::new(),
            project_leader: None,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of actual amounts across all opex entries
    pub fn total_opex_actual(&self) -> Money {
        self.opex_expenditures.iter().map(|o| o.actual_amount).sum()
    }

    pub fn add_opex(&mut self, opex: Opex) {
        self.opex_expenditures.push(opex);
        self.updated_at = Utc::now();
    }

    /// Remove the opex entry at `index`, if there is one
    pub fn remove_opex(&mut self, index: usize) -> Option<Opex> {
        if index >= self.opex_expenditures.len() {
            return None;
        }
        self.updated_at = Utc::now();
        Some(self.opex_expenditures.remove(index))
    }

    /// Add a capex reference; returns false if it was already linked
    pub fn link_capex(&mut self, capex_id: CapexId) -> bool {
        if self.capex_expenditures.contains(&capex_id) {
            return false;
        }
        self.capex_expenditures.push(capex_id);
        self.updated_at = Utc::now();
        true
    }

    /// Drop a capex reference; returns false if it wasn't linked
    pub fn unlink_capex(&mut self, capex_id: CapexId) -> bool {
        let before = self.capex_expenditures.len();
        self.capex_expenditures.retain(|id| *id != capex_id);
        let removed = self.capex_expenditures.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn record_status(&mut self, status: impl Into<String>, date: NaiveDate) {
        self.project_status.push(StatusEntry {
            status: status.into(),
            date,
        });
        self.updated_at = Utc::now();
    }

    /// The most recently recorded status, if any
    pub fn current_status(&self) -> Option<&StatusEntry> {
        self.project_status.iter().max_by_key(|s| s.date)
    }

    /// Add a member, or update their role if they already belong to the project
    pub fn upsert_member(&mut self, user_id: UserId, role: impl Into<String>) {
        let role = role.into();
        match self.members.iter_mut().find(|m| m.user_id == user_id) {
            Some(member) => member.role = role,
            None => self.members.push(Member { user_id, role }),
        }
        self.updated_at = Utc::now();
    }

    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Validate the project
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        if name.len() > 255 {
            return Err(ProjectValidationError::NameTooLong(name.len()));
        }
        if self.description.trim().is_empty() {
            return Err(ProjectValidationError::EmptyDescription);
        }
        if self.description.len() > 1000 {
            return Err(ProjectValidationError::DescriptionTooLong(
                self.description.len(),
            ));
        }

        let start = self
            .estimated_start_date
            .ok_or(ProjectValidationError::MissingStartDate)?;
        let end = self
            .estimated_end_date
            .ok_or(ProjectValidationError::MissingEndDate)?;
        if end < start {
            return Err(ProjectValidationError::EndBeforeStart { start, end });
        }

        if self.total_budget.is_negative() {
            return Err(ProjectValidationError::NegativeBudget("totalBudget"));
        }
        if self.forecasted_budget.is_negative() {
            return Err(ProjectValidationError::NegativeBudget("forecastedBudget"));
        }
        if self.total_budget.exceeds_max() {
            return Err(ProjectValidationError::AmountTooLarge("totalBudget"));
        }
        if self.forecasted_budget.exceeds_max() {
            return Err(ProjectValidationError::AmountTooLarge("forecastedBudget"));
        }

        for (index, opex) in self.opex_expenditures.iter().enumerate() {
            if opex.person_name.trim().is_empty() || opex.role.trim().is_empty() {
                return Err(ProjectValidationError::InvalidOpex(index));
            }
            if opex.estimated_amount.is_negative() || opex.actual_amount.is_negative() {
                return Err(ProjectValidationError::InvalidOpex(index));
            }
            if opex.estimated_amount.exceeds_max() || opex.actual_amount.exceeds_max() {
                return Err(ProjectValidationError::AmountTooLarge("opex amount"));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    NameTooLong(usize),
    EmptyDescription,
    DescriptionTooLong(usize),
    MissingStartDate,
    MissingEndDate,
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    NegativeBudget(&'static str),
    AmountTooLarge(&'static str),
    InvalidOpex(usize),
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Project name is required"),
            Self::NameTooLong(len) => {
                write!(f, "Project name too long ({} chars, max 255)", len)
            }
            Self::EmptyDescription => write!(f, "Project description is required"),
            Self::DescriptionTooLong(len) => {
                write!(f, "Project description too long ({} chars, max 1000)", len)
            }
            Self::MissingStartDate => write!(f, "Project estimated start date is required"),
            Self::MissingEndDate => write!(f, "Project estimated end date is required"),
            Self::EndBeforeStart { start, end } => write!(
                f,
                "Project estimated end date {} is before its start date {}",
                end, start
            ),
            Self::NegativeBudget(field) => write!(f, "{} must not be negative", field),
            Self::AmountTooLarge(field) => write!(f, "{} exceeds {}", field, Money::MAX),
            Self::InvalidOpex(index) => write!(
                f,
                "Opex entry {} needs a person, a role and non-negative amounts",
                index
            ),
        }
    }
}

impl std::error::Error for ProjectValidationError {}
