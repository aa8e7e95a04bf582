//! Capital expenditure model
//!
//! Capex records live on their own and are shared by reference: a project lists
//! the ids it owns, and each record points back with `project_id`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CapexId, ProjectId, SupplierId};
use super::money::Money;

fn default_status() -> String {
    "pending".to_string()
}

/// A capital expenditure record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capex {
    pub id: CapexId,

    pub date: NaiveDate,

    pub estimated_amount: Money,

    pub actual_amount: Money,

    /// Free-form category, e.g. "hardware" or "licence"
    #[serde(rename = "type")]
    pub capex_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub supplier_id: Option<SupplierId>,

    #[serde(default)]
    pub project_id: Option<ProjectId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Capex {
    pub fn new(
        date: NaiveDate,
        capex_type: impl Into<String>,
        estimated_amount: Money,
        actual_amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CapexId::new(),
            date,
            estimated_amount,
            actual_amount,
            capex_type: capex_type.into(),
            description: String::new(),
            status: default_status(),
            supplier_id: None,
            project_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn validate(&self) -> Result<(), CapexValidationError> {
        if self.capex_type.trim().is_empty() {
            return Err(CapexValidationError::EmptyType);
        }
        if !self.estimated_amount.is_positive() {
            return Err(CapexValidationError::NonPositiveAmount("estimatedAmount"));
        }
        if !self.actual_amount.is_positive() {
            return Err(CapexValidationError::NonPositiveAmount("actualAmount"));
        }
        if self.estimated_amount.exceeds_max() {
            return Err(CapexValidationError::AmountTooLarge("estimatedAmount"));
        }
        if self.actual_amount.exceeds_max() {
            return Err(CapexValidationError::AmountTooLarge("actualAmount"));
        }
        if self.status.trim().is_empty() {
            return Err(CapexValidationError::EmptyStatus);
        }
        Ok(())
    }
}

impl fmt::Display for Capex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.date, self.capex_type, self.actual_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapexValidationError {
    EmptyType,
    NonPositiveAmount(&'static str),
    AmountTooLarge(&'static str),
    EmptyStatus,
}

impl fmt::Display for CapexValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyType => write!(f, "Capex type is required"),
            Self::NonPositiveAmount(field) => write!(f, "{} must be positive", field),
            Self::AmountTooLarge(field) => write!(f, "{} exceeds {}", field, Money::MAX),
            Self::EmptyStatus => write!(f, "Capex status cannot be empty"),
        }
    }
}

impl std::error::Error for CapexValidationError {}
