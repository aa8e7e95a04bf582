//! Capex display formatting

use crate::models::Capex;

/// Format a list of capex records as a table
pub fn format_capex_list(records: &[Capex], currency_symbol: &str) -> String {
    if records.is_empty() {
        return "No capex records found.".to_string();
    }

    let type_width = records
        .iter()
        .map(|c| c.capex_type.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<13}  {:<10}  {:<type_width$}  {:>14}  {:>14}  {:<10}  {}\n",
        "ID",
        "Date",
        "Type",
        "Estimated",
        "Actual",
        "Status",
        "Project",
        type_width = type_width,
    ));
    output.push_str(&format!(
        "{:-<13}  {:-<10}  {:-<type_width$}  {:->14}  {:->14}  {:-<10}  {:-<13}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        type_width = type_width,
    ));

    for capex in records {
        output.push_str(&format!(
            "{:<13}  {:<10}  {:<type_width$}  {:>14}  {:>14}  {:<10}  {}\n",
            capex.id.to_string(),
            capex.date,
            capex.capex_type,
            capex.estimated_amount.format_with_symbol(currency_symbol),
            capex.actual_amount.format_with_symbol(currency_symbol),
            capex.status,
            capex
                .project_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            type_width = type_width,
        ));
    }

    let total_estimated: crate::models::Money = records.iter().map(|c| c.estimated_amount).sum();
    let total_actual: crate::models::Money = records.iter().map(|c| c.actual_amount).sum();
    output.push_str(&format!(
        "{:<13}  {:<10}  {:<type_width$}  {:>14}  {:>14}\n",
        "TOTAL",
        "",
        "",
        total_estimated.format_with_symbol(currency_symbol),
        total_actual.format_with_symbol(currency_symbol),
        type_width = type_width,
    ));

    output
}

pub fn format_capex_details(capex: &Capex, currency_symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Capex: {}\n", capex.capex_type));
    output.push_str(&format!("  ID:         {}\n", capex.id.as_uuid()));
    output.push_str(&format!("  Date:       {}\n", capex.date));
    output.push_str(&format!("  Status:     {}\n", capex.status));
    output.push_str(&format!(
        "  Estimated:  {}\n",
        capex.estimated_amount.format_with_symbol(currency_symbol)
    ));
    output.push_str(&format!(
        "  Actual:     {}\n",
        capex.actual_amount.format_with_symbol(currency_symbol)
    ));
    if let Some(project_id) = capex.project_id {
        output.push_str(&format!("  Project:    {}\n", project_id.as_uuid()));
    }
    if let Some(supplier_id) = capex.supplier_id {
        output.push_str(&format!("  Supplier:   {}\n", supplier_id.as_uuid()));
    }
    if !capex.description.is_empty() {
        output.push('\n');
        output.push_str(&format!("  {}\n", capex.description));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn sample() -> Capex {
        Capex::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            "Hardware",
            Money::from_cents(120000),
            Money::from_cents(100000),
        )
    }

    #[test]
    fn test_list_totals() {
        let output = format_capex_list(&[sample(), sample()], "$");
        assert!(output.contains("Hardware"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("$2400.00"));
        assert!(output.contains("$2000.00"));
    }

    #[test]
    fn test_details() {
        let capex = sample().with_description("Two racks");
        let output = format_capex_details(&capex, "€");
        assert!(output.contains("Capex: Hardware"));
        assert!(output.contains("€1000.00"));
        assert!(output.contains("Two racks"));
        assert!(!output.contains("Supplier:"));
    }
}
