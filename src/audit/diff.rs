//! Change summaries for update entries

use serde_json::Value;

/// Bookkeeping fields that change on every write
const IGNORED_FIELDS: &[&str] = &["updatedAt"];

/// Summarize top-level field changes between two serialized records
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            let mut changes: Vec<String> = old
                .iter()
                .filter(|(key, _)| !IGNORED_FIELDS.contains(&key.as_str()))
                .filter_map(|(key, old_val)| match new.get(key) {
                    Some(new_val) if new_val == old_val => None,
                    Some(new_val) => Some(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(old_val),
                        format_value(new_val)
                    )),
                    None => Some(format!("{}: {} -> (removed)", key, format_value(old_val))),
                })
                .collect();

            changes.extend(
                new.iter()
                    .filter(|(key, _)| !old.contains_key(*key))
                    .map(|(key, val)| format!("{}: (added) -> {}", key, format_value(val))),
            );
            changes
        }
        _ if before != after => vec![format!(
            "{} -> {}",
            format_value(before),
            format_value(after)
        )],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let truncated: String = s.chars().take(47).collect();
            format!("\"{}...\"", truncated)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
