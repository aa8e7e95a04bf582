//! Monthly budget-vs-actual breakdown
//!
//! Spreads a project's forecasted budget evenly over its estimated duration
//! and sums the actual and estimated amounts of its opex entries and capex
//! records into one row per calendar month.
//!
//! Rows are derived on every call and never stored.

use std::io::Write;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::money::as_units;
use crate::models::{Capex, Money, Project, ProjectId};

use super::source::ProjectSource;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Which calendar months become rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthEnumeration {
    /// Only the months of the start date's year that fall inside the range.
    /// A range reaching into a later year loses those months, while the
    /// budget share still divides by the full month span.
    #[default]
    StartYear,
    /// Every month from the start month through the end month
    FullRange,
}

impl MonthEnumeration {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "start-year" | "start_year" => Some(Self::StartYear),
            "full-range" | "full_range" => Some(Self::FullRange),
            _ => None,
        }
    }
}

impl std::fmt::Display for MonthEnumeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartYear => write!(f, "start-year"),
            Self::FullRange => write!(f, "full-range"),
        }
    }
}

/// One calendar month of a project's breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdownRow {
    pub month: String,
    /// 0 = January
    pub month_index: u32,
    pub year: i32,
    /// Forecasted budget divided by the number of months in the range
    pub budgeted_amount: f64,
    #[serde(with = "as_units")]
    pub actual_spent: Money,
    #[serde(with = "as_units")]
    pub estimated_expenses: Money,
}

/// Month position as a single ordinal, so ranges compare across years
fn month_key(year: i32, month_index: u32) -> i64 {
    year as i64 * 12 + month_index as i64
}

fn key_to_year_month(key: i64) -> (i32, u32) {
    (key.div_euclid(12) as i32, key.rem_euclid(12) as u32)
}

/// An expenditure reduced to the fields the breakdown needs
struct Entry {
    key: i64,
    actual: Money,
    estimated: Money,
}

fn entry_for(date: NaiveDate, actual: Money, estimated: Money) -> Entry {
    Entry {
        key: month_key(date.year(), date.month0()),
        actual,
        estimated,
    }
}

fn estimated_range(project: &Project) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let start = project.estimated_start_date.ok_or_else(|| {
        LedgerError::Validation(format!(
            "Project '{}' has no estimated start date",
            project.name
        ))
    })?;
    let end = project.estimated_end_date.ok_or_else(|| {
        LedgerError::Validation(format!(
            "Project '{}' has no estimated end date",
            project.name
        ))
    })?;
    if end < start {
        return Err(LedgerError::Validation(format!(
            "Project '{}' ends ({}) before it starts ({})",
            project.name, end, start
        )));
    }
    Ok((start, end))
}

/// Exact total of one month's amounts; overflow is a validation error
fn month_total(
    project: &str,
    key: i64,
    amounts: impl Iterator<Item = Money>,
) -> LedgerResult<Money> {
    Money::checked_sum(amounts).ok_or_else(|| {
        let (year, month_index) = key_to_year_month(key);
        LedgerError::Validation(format!(
            "Spend for project '{}' in {} {} is too large to total",
            project, MONTH_NAMES[month_index as usize], year
        ))
    })
}

/// Build the breakdown for a project whose capex records are already resolved
///
/// `capex` must be the records behind `project.capex_expenditures`.
pub fn build_monthly_breakdown(
    project: &Project,
    capex: &[Capex],
    enumeration: MonthEnumeration,
) -> LedgerResult<Vec<MonthlyBreakdownRow>> {
    let (start, end) = estimated_range(project)?;
    let start_key = month_key(start.year(), start.month0());
    let end_key = month_key(end.year(), end.month0());

    let total_months = end_key - start_key + 1;
    let budgeted_amount = project.forecasted_budget.to_units() / total_months as f64;

    let candidates: Vec<i64> = match enumeration {
        MonthEnumeration::StartYear => (0..12).map(|m| month_key(start.year(), m)).collect(),
        MonthEnumeration::FullRange => (start_key..=end_key).collect(),
    };

    let entries: Vec<Entry> = project
        .opex_expenditures
        .iter()
        .map(|o| entry_for(o.date, o.actual_amount, o.estimated_amount))
        .chain(
            capex
                .iter()
                .map(|c| entry_for(c.date, c.actual_amount, c.estimated_amount)),
        )
        .collect();

    let mut rows: Vec<MonthlyBreakdownRow> = candidates
        .into_iter()
        .filter(|key| (start_key..=end_key).contains(key))
        .map(|key| {
            let (year, month_index) = key_to_year_month(key);
            let matching = || entries.iter().filter(move |e| e.key == key);
            let actual_spent = month_total(&project.name, key, matching().map(|e| e.actual))?;
            let estimated_expenses =
                month_total(&project.name, key, matching().map(|e| e.estimated))?;
            Ok(MonthlyBreakdownRow {
                month: MONTH_NAMES[month_index as usize].to_string(),
                month_index,
                year,
                budgeted_amount,
                actual_spent,
                estimated_expenses,
            })
        })
        .collect::<LedgerResult<_>>()?;

    rows.sort_by_key(|r| (r.year, r.month_index));
    Ok(rows)
}

/// Look up a project and its capex records, then build its breakdown
pub fn compute_monthly_breakdown<S: ProjectSource + ?Sized>(
    source: &S,
    project_id: ProjectId,
    enumeration: MonthEnumeration,
) -> LedgerResult<Vec<MonthlyBreakdownRow>> {
    let project = source
        .project_by_id(project_id)?
        .ok_or_else(|| LedgerError::project_not_found(project_id.as_uuid().to_string()))?;
    let capex = source.capex_by_ids(&project.capex_expenditures)?;
    build_monthly_breakdown(&project, &capex, enumeration)
}

/// A project's breakdown with enough context to print or export it
#[derive(Debug, Clone)]
pub struct BreakdownReport {
    pub project_id: ProjectId,
    pub project_name: String,
    pub forecasted_budget: Money,
    pub rows: Vec<MonthlyBreakdownRow>,
}

impl BreakdownReport {
    pub fn generate<S: ProjectSource + ?Sized>(
        source: &S,
        project: &Project,
        enumeration: MonthEnumeration,
    ) -> LedgerResult<Self> {
        Ok(Self {
            project_id: project.id,
            project_name: project.name.clone(),
            forecasted_budget: project.forecasted_budget,
            rows: compute_monthly_breakdown(source, project.id, enumeration)?,
        })
    }

    pub fn total_actual(&self) -> Money {
        self.rows.iter().map(|r| r.actual_spent).sum()
    }

    pub fn total_estimated(&self) -> Money {
        self.rows.iter().map(|r| r.estimated_expenses).sum()
    }

    pub fn format_terminal(&self, currency_symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Monthly Breakdown: {}\n", self.project_name));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "Forecasted Budget: {}\n\n",
            self.forecasted_budget.format_with_symbol(currency_symbol)
        ));

        output.push_str(&format!(
            "{:<16} {:>16} {:>18} {:>18}\n",
            "Month", "Budgeted", "Actual Spent", "Estimated"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<16} {:>16} {:>18} {:>18}\n",
                format!("{} {}", row.month, row.year),
                format!("{}{:.2}", currency_symbol, row.budgeted_amount),
                row.actual_spent.format_with_symbol(currency_symbol),
                row.estimated_expenses.format_with_symbol(currency_symbol),
            ));
        }

        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<16} {:>16} {:>18} {:>18}\n",
            "TOTAL",
            "",
            self.total_actual().format_with_symbol(currency_symbol),
            self.total_estimated().format_with_symbol(currency_symbol),
        ));

        output
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| LedgerError::Export(e.to_string());

        csv.write_record([
            "Project",
            "Year",
            "Month",
            "Budgeted",
            "Actual Spent",
            "Estimated Expenses",
        ])
        .map_err(export_err)?;

        for row in &self.rows {
            csv.write_record([
                self.project_name.clone(),
                row.year.to_string(),
                row.month.clone(),
                format!("{:.2}", row.budgeted_amount),
                format!("{:.2}", row.actual_spent.to_units()),
                format!("{:.2}", row.estimated_expenses.to_units()),
            ])
            .map_err(export_err)?;
        }

        csv.flush().map_err(LedgerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::Opex;
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project(start: NaiveDate, end: NaiveDate, forecast: i64) -> Project {
        Project::new("Apollo", "refit", start, end, Money::from_units(forecast))
    }

    fn opex(on: NaiveDate, actual: i64, estimated: i64) -> Opex {
        Opex::new(
            on,
            "Ada",
            "Engineer",
            Money::from_units(estimated),
            Money::from_units(actual),
        )
    }

    fn capex(on: NaiveDate, actual: i64, estimated: i64) -> Capex {
        Capex::new(
            on,
            "hardware",
            Money::from_units(estimated),
            Money::from_units(actual),
        )
    }

    #[test]
    fn test_quarter_with_one_opex() {
        let mut p = project(date(2024, 1, 1), date(2024, 3, 31), 900_000);
        p.add_opex(opex(date(2024, 2, 10), 45_000, 50_000));

        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap();

        assert_eq!(rows.len(), 3);
        let months: Vec<_> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, vec!["January", "February", "March"]);
        assert!(rows.iter().all(|r| r.budgeted_amount == 300_000.0));
        assert_eq!(rows[0].actual_spent, Money::zero());
        assert_eq!(rows[1].actual_spent, Money::from_units(45_000));
        assert_eq!(rows[1].estimated_expenses, Money::from_units(50_000));
        assert_eq!(rows[2].actual_spent, Money::zero());
    }

    #[test]
    fn test_month_total_overflow_is_validation_error() {
        let mut p = project(date(2024, 1, 1), date(2024, 3, 31), 900_000);
        p.add_opex(opex(date(2024, 2, 10), 50_000_000_000_000_000, 0));
        p.add_opex(opex(date(2024, 2, 11), 50_000_000_000_000_000, 0));

        let err = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("February 2024"));
    }

    #[test]
    fn test_same_month_range_gets_whole_budget() {
        let p = project(date(2024, 5, 3), date(2024, 5, 28), 12_345);
        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, "May");
        assert_eq!(rows[0].month_index, 4);
        assert_eq!(rows[0].budgeted_amount, 12_345.0);
    }

    #[test]
    fn test_mid_month_start_keeps_first_month() {
        let p = project(date(2024, 1, 15), date(2024, 4, 10), 4_000);
        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].month, "January");
        assert_eq!(rows[3].month, "April");
    }

    #[test]
    fn test_budget_shares_sum_to_forecast_within_start_year() {
        let p = project(date(2024, 2, 1), date(2024, 8, 31), 700_001);
        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap();

        let total: f64 = rows.iter().map(|r| r.budgeted_amount).sum();
        assert_eq!(rows.len(), 7);
        assert!((total - 700_001.0).abs() < 1e-6);
    }

    #[test]
    fn test_opex_and_capex_are_merged() {
        let mut p = project(date(2024, 1, 1), date(2024, 2, 29), 10_000);
        p.add_opex(opex(date(2024, 1, 3), 100, 120));
        p.add_opex(opex(date(2024, 1, 30), 200, 180));
        let records = vec![
            capex(date(2024, 1, 15), 1_000, 1_100),
            capex(date(2024, 2, 1), 500, 400),
        ];

        let rows = build_monthly_breakdown(&p, &records, MonthEnumeration::StartYear).unwrap();

        assert_eq!(rows[0].actual_spent, Money::from_units(1_300));
        assert_eq!(rows[0].estimated_expenses, Money::from_units(1_400));
        assert_eq!(rows[1].actual_spent, Money::from_units(500));
        assert_eq!(rows[1].estimated_expenses, Money::from_units(400));
    }

    #[test]
    fn test_entries_outside_range_or_other_years_are_ignored() {
        let mut p = project(date(2024, 3, 1), date(2024, 4, 30), 2_000);
        p.add_opex(opex(date(2023, 3, 10), 999, 999));
        p.add_opex(opex(date(2024, 6, 1), 999, 999));

        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap();
        assert!(rows.iter().all(|r| r.actual_spent.is_zero()));
    }

    #[test]
    fn test_multi_year_range_under_start_year_enumeration() {
        let p = project(date(2024, 11, 1), date(2025, 2, 28), 4_000);
        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap();

        // Months of 2025 are not enumerated, but the share still divides by 4
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].year, rows[0].month_index), (2024, 10));
        assert_eq!((rows[1].year, rows[1].month_index), (2024, 11));
        assert!(rows.iter().all(|r| r.budgeted_amount == 1_000.0));
    }

    #[test]
    fn test_multi_year_range_under_full_range_enumeration() {
        let mut p = project(date(2024, 11, 1), date(2025, 2, 28), 4_000);
        p.add_opex(opex(date(2025, 1, 20), 75, 80));

        let rows = build_monthly_breakdown(&p, &[], MonthEnumeration::FullRange).unwrap();

        let keys: Vec<_> = rows.iter().map(|r| (r.year, r.month_index)).collect();
        assert_eq!(keys, vec![(2024, 10), (2024, 11), (2025, 0), (2025, 1)]);
        assert_eq!(rows[2].actual_spent, Money::from_units(75));
        let total: f64 = rows.iter().map(|r| r.budgeted_amount).sum();
        assert!((total - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rows_strictly_ordered() {
        let p = project(date(2023, 6, 1), date(2025, 6, 1), 1_000);
        for enumeration in [MonthEnumeration::StartYear, MonthEnumeration::FullRange] {
            let rows = build_monthly_breakdown(&p, &[], enumeration).unwrap();
            assert!(rows
                .windows(2)
                .all(|w| (w[0].year, w[0].month_index) < (w[1].year, w[1].month_index)));
        }
    }

    #[test]
    fn test_missing_or_inverted_dates_are_validation_errors() {
        let mut p = project(date(2024, 1, 1), date(2024, 3, 31), 100);
        p.estimated_end_date = None;
        let err = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap_err();
        assert!(err.is_validation());

        let p = project(date(2024, 3, 1), date(2024, 1, 1), 100);
        let err = build_monthly_breakdown(&p, &[], MonthEnumeration::StartYear).unwrap_err();
        assert!(err.is_validation());
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_compute_dereferences_linked_capex() {
        let (_temp_dir, storage) = create_test_storage();
        let mut p = project(date(2024, 1, 1), date(2024, 3, 31), 900_000);
        let record = capex(date(2024, 3, 5), 20_000, 25_000).with_project(p.id);
        p.link_capex(record.id);
        storage.capex.upsert(record).unwrap();
        storage.projects.upsert(p.clone()).unwrap();

        let rows = compute_monthly_breakdown(&storage, p.id, MonthEnumeration::StartYear).unwrap();
        assert_eq!(rows[2].actual_spent, Money::from_units(20_000));

        let again = compute_monthly_breakdown(&storage, p.id, MonthEnumeration::StartYear).unwrap();
        assert_eq!(rows, again);
    }

    #[test]
    fn test_compute_unknown_project_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let err = compute_monthly_breakdown(&storage, ProjectId::new(), MonthEnumeration::StartYear)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_compute_dangling_capex_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let mut p = project(date(2024, 1, 1), date(2024, 3, 31), 900_000);
        p.link_capex(crate::models::CapexId::new());
        storage.projects.upsert(p.clone()).unwrap();

        let err = compute_monthly_breakdown(&storage, p.id, MonthEnumeration::StartYear)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NotFound {
                entity_type: "Capex",
                ..
            }
        ));
    }

    #[test]
    fn test_report_csv_and_terminal() {
        let (_temp_dir, storage) = create_test_storage();
        let mut p = project(date(2024, 1, 1), date(2024, 2, 29), 2_000);
        p.add_opex(opex(date(2024, 2, 2), 150, 100));
        storage.projects.upsert(p.clone()).unwrap();

        let report = BreakdownReport::generate(&storage, &p, MonthEnumeration::StartYear).unwrap();
        assert_eq!(report.total_actual(), Money::from_units(150));

        let text = report.format_terminal("$");
        assert!(text.contains("February 2024"));
        assert!(text.contains("$1000.00"));

        let mut buf = Vec::new();
        report.export_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Apollo,2024,February,1000.00,150.00,100.00");
    }

    #[test]
    fn test_row_serializes_camel_case_units() {
        let row = MonthlyBreakdownRow {
            month: "February".into(),
            month_index: 1,
            year: 2024,
            budgeted_amount: 300_000.0,
            actual_spent: Money::from_units(45_000),
            estimated_expenses: Money::zero(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["monthIndex"], 1);
        assert_eq!(json["actualSpent"], 45_000.0);
        assert_eq!(json["budgetedAmount"], 300_000.0);
    }
}
