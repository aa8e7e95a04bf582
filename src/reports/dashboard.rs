//! Project dashboard: budget totals, opex/capex split and the monthly series

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Capex, Money, Project};

use super::breakdown::{build_monthly_breakdown, MonthEnumeration, MonthlyBreakdownRow};
use super::source::ProjectSource;

/// Summary view of one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// `[totalBudget, forecastedBudget]`
    pub budget_expenditure: [f64; 2],
    /// `[total opex actual, total capex actual]`
    pub expenditure_breakdown: [f64; 2],
    /// Opex share of actual spend, 0 when nothing has been spent
    pub opex_vs_capex: f64,
    pub monthly: Vec<MonthlyBreakdownRow>,
}

/// Share of `opex` in `opex + capex`
pub fn opex_ratio(opex: Money, capex: Money) -> f64 {
    let total = opex.cents() as f64 + capex.cents() as f64;
    if total == 0.0 {
        0.0
    } else {
        opex.cents() as f64 / total
    }
}

fn total(
    project: &Project,
    what: &str,
    amounts: impl Iterator<Item = Money>,
) -> LedgerResult<Money> {
    Money::checked_sum(amounts).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Total {} for project '{}' is too large",
            what, project.name
        ))
    })
}

impl DashboardSummary {
    /// Summarize a project whose capex records are already resolved
    pub fn build(
        project: &Project,
        capex: &[Capex],
        enumeration: MonthEnumeration,
    ) -> LedgerResult<Self> {
        let total_opex = total(
            project,
            "opex",
            project.opex_expenditures.iter().map(|o| o.actual_amount),
        )?;
        let total_capex = total(project, "capex", capex.iter().map(|c| c.actual_amount))?;

        Ok(Self {
            budget_expenditure: [
                project.total_budget.to_units(),
                project.forecasted_budget.to_units(),
            ],
            expenditure_breakdown: [total_opex.to_units(), total_capex.to_units()],
            opex_vs_capex: opex_ratio(total_opex, total_capex),
            // same engine core as compute_monthly_breakdown, over the records already in hand
            monthly: build_monthly_breakdown(project, capex, enumeration)?,
        })
    }

    pub fn format_terminal(&self, project_name: &str, currency_symbol: &str) -> String {
        let money = |units: f64| format!("{}{:.2}", currency_symbol, units);
        let mut output = String::new();

        output.push_str(&format!("Dashboard: {}\n", project_name));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>16}\n",
            "Total Budget:",
            money(self.budget_expenditure[0])
        ));
        output.push_str(&format!(
            "{:<24} {:>16}\n",
            "Forecasted Budget:",
            money(self.budget_expenditure[1])
        ));
        output.push_str(&format!(
            "{:<24} {:>16}\n",
            "Opex (actual):",
            money(self.expenditure_breakdown[0])
        ));
        output.push_str(&format!(
            "{:<24} {:>16}\n",
            "Capex (actual):",
            money(self.expenditure_breakdown[1])
        ));
        output.push_str(&format!(
            "{:<24} {:>15.1}%\n\n",
            "Opex share:",
            self.opex_vs_capex * 100.0
        ));

        output.push_str(&format!(
            "{:<16} {:>14} {:>14} {:>14}\n",
            "Month", "Budgeted", "Actual", "Estimated"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for row in &self.monthly {
            output.push_str(&format!(
                "{:<16} {:>14} {:>14} {:>14}\n",
                format!("{} {}", row.month, row.year),
                money(row.budgeted_amount),
                row.actual_spent.format_with_symbol(currency_symbol),
                row.estimated_expenses.format_with_symbol(currency_symbol),
            ));
        }

        output
    }

    /// Totals as key/value rows followed by the monthly series
    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        let export_err = |e: csv::Error| LedgerError::Export(e.to_string());

        let totals = [
            ("Total Budget", self.budget_expenditure[0]),
            ("Forecasted Budget", self.budget_expenditure[1]),
            ("Total Opex", self.expenditure_breakdown[0]),
            ("Total Capex", self.expenditure_breakdown[1]),
        ];
        for (label, value) in totals {
            csv.write_record([label.to_string(), format!("{:.2}", value)])
                .map_err(export_err)?;
        }
        csv.write_record(["Opex Ratio".to_string(), format!("{:.4}", self.opex_vs_capex)])
            .map_err(export_err)?;

        csv.write_record(["Year", "Month", "Budgeted", "Actual Spent", "Estimated Expenses"])
            .map_err(export_err)?;
        for row in &self.monthly {
            csv.write_record([
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

/// Dashboard for the project with this name (case-insensitive)
///
/// An unknown name yields `Ok(None)`; a malformed project or a dangling capex
/// reference is an error.
pub fn compute_dashboard<S: ProjectSource + ?Sized>(
    source: &S,
    project_name: &str,
    enumeration: MonthEnumeration,
) -> LedgerResult<Option<DashboardSummary>> {
    let Some(project) = source.project_by_name(project_name)? else {
        return Ok(None);
    };
    let capex = source.capex_by_ids(&project.capex_expenditures)?;
    DashboardSummary::build(&project, &capex, enumeration).map(Some)
}
