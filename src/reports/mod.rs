//! Derived project reports
//!
//! The monthly breakdown engine and the dashboard built on top of it. Both
//! read through `ProjectSource` and never write.

pub mod breakdown;
pub mod dashboard;
pub mod source;

pub use breakdown::{
    build_monthly_breakdown, compute_monthly_breakdown, BreakdownReport, MonthEnumeration,
    MonthlyBreakdownRow, MONTH_NAMES,
};
pub use dashboard::{compute_dashboard, opex_ratio, DashboardSummary};
pub use source::ProjectSource;
