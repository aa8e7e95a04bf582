//! Project display formatting
//!
//! Formats projects for terminal output in table and detail views.

use crate::models::Project;

/// Format a list of projects as a table
pub fn format_project_list(projects: &[Project], currency_symbol: &str) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let name_width = projects
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<10}  {:<10}  {:>14}  {:>14}  {}\n",
        "Name",
        "Start",
        "End",
        "Forecast",
        "Opex Actual",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<10}  {:-<10}  {:->14}  {:->14}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for project in projects {
        output.push_str(&format!(
            "{:<name_width$}  {:<10}  {:<10}  {:>14}  {:>14}  {}\n",
            project.name,
            format_date(project.estimated_start_date),
            format_date(project.estimated_end_date),
            project.forecasted_budget.format_with_symbol(currency_symbol),
            project.total_opex_actual().format_with_symbol(currency_symbol),
            project
                .current_status()
                .map(|s| s.status.as_str())
                .unwrap_or(""),
            name_width = name_width,
        ));
    }

    output
}

/// Format a single project's details, including opex entries and members
pub fn format_project_details(project: &Project, currency_symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Project: {}\n", project.name));
    output.push_str(&format!("  ID:               {}\n", project.id.as_uuid()));
    if !project.description.is_empty() {
        output.push_str(&format!("  Description:      {}\n", project.description));
    }
    output.push_str(&format!(
        "  Estimated:        {} to {}\n",
        format_date(project.estimated_start_date),
        format_date(project.estimated_end_date)
    ));
    if project.actual_start_date.is_some() || project.actual_end_date.is_some() {
        output.push_str(&format!(
            "  Actual:           {} to {}\n",
            format_date(project.actual_start_date),
            format_date(project.actual_end_date)
        ));
    }
    output.push('\n');
    output.push_str(&format!(
        "  Total Budget:     {}\n",
        project.total_budget.format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!(
        "  Forecast Budget:  {}\n",
        project.forecasted_budget.format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!(
        "  Capex Records:    {}\n",
        project.capex_expenditures.len()
    ));

    if let Some(status) = project.current_status() {
        output.push_str(&format!("  Status:           {} (since {})\n", status.status, status.date));
    }

    if !project.opex_expenditures.is_empty() {
        output.push('\n');
        output.push_str("  Opex:\n");
        for (index, opex) in project.opex_expenditures.iter().enumerate() {
            output.push_str(&format!(
                "    [{}] {}  {:<20} {:<12} est {:>12}  act {:>12}\n",
                index,
                opex.date,
                opex.person_name,
                opex.role,
                opex.estimated_amount.format_with_symbol(currency_symbol),
                opex.actual_amount.format_with_symbol(currency_symbol),
            ));
        }
    }

    if project.project_leader.is_some() || !project.members.is_empty() {
        output.push('\n');
        if let Some(leader) = project.project_leader {
            output.push_str(&format!("  Leader:           {}\n", leader.as_uuid()));
        }
        for member in &project.members {
            output.push_str(&format!("  Member:           {} ({})\n", member.user_id.as_uuid(), member.role));
        }
    }

    output
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, Opex};
    use chrono::NaiveDate;

    fn sample() -> Project {
        Project::new(
            "Apollo",
            "Moon shot",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            Money::from_cents(900000),
        )
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_project_list(&[], "$"), "No projects found.");
    }

    #[test]
    fn test_list_contains_row() {
        let output = format_project_list(&[sample()], "$");
        assert!(output.contains("Apollo"));
        assert!(output.contains("2024-01-01"));
        assert!(output.contains("$9000.00"));
    }

    #[test]
    fn test_details_show_opex() {
        let mut project = sample();
        project.add_opex(Opex::new(
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            "Ada",
            "Engineer",
            Money::from_cents(40000),
            Money::from_cents(45000),
        ));
        let output = format_project_details(&project, "$");
        assert!(output.contains("Project: Apollo"));
        assert!(output.contains("Ada"));
        assert!(output.contains("$450.00"));
    }
}
