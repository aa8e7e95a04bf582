//! Read access the breakdown engine needs from whatever holds the records

use crate::error::LedgerResult;
use crate::models::{Capex, CapexId, Project, ProjectId};

/// Lookup of projects and their capex records
pub trait ProjectSource {
    fn project_by_id(&self, id: ProjectId) -> LedgerResult<Option<Project>>;

    /// Case-insensitive lookup by project name
    fn project_by_name(&self, name: &str) -> LedgerResult<Option<Project>>;

    /// Resolve capex ids in order; any id without a record is a `NotFound` error
    fn capex_by_ids(&self, ids: &[CapexId]) -> LedgerResult<Vec<Capex>>;
}
