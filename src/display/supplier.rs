//! Supplier display formatting

use crate::models::Supplier;

pub fn format_supplier_list(suppliers: &[Supplier]) -> String {
    if suppliers.is_empty() {
        return "No suppliers found.".to_string();
    }

    let name_width = suppliers
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>8}  {}\n",
        "Name",
        "Contacts",
        "Address",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->8}  {:-<20}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for supplier in suppliers {
        output.push_str(&format!(
            "{:<name_width$}  {:>8}  {}\n",
            supplier.name,
            supplier.contact_persons.len(),
            supplier.address,
            name_width = name_width,
        ));
    }

    output
}

pub fn format_supplier_details(supplier: &Supplier) -> String {
    let mut output = String::new();

    output.push_str(&format!("Supplier: {}\n", supplier.name));
    output.push_str(&format!("  ID:       {}\n", supplier.id.as_uuid()));
    output.push_str(&format!("  Address:  {}\n", supplier.address));
    if let Some(logo) = &supplier.logo {
        output.push_str(&format!("  Logo:     {}\n", logo));
    }
    for contact in &supplier.contact_persons {
        output.push_str(&format!("  Contact:  {}\n", contact.as_uuid()));
    }

    output
}
