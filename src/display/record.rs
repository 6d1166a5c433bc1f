//! Change-log display formatting
//!
//! Formats change-log records for terminal output in list and detail views.

use crate::audit::{Action, ChangeLog};

/// Format a list of records as a table
pub fn format_record_list(records: &[ChangeLog]) -> String {
    if records.is_empty() {
        return "No change logs found.".to_string();
    }

    let type_width = records
        .iter()
        .map(|r| r.object_type.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let id_width = records
        .iter()
        .map(|r| r.object_id.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<23}  {:<6}  {:<type_width$}  {:<id_width$}  {:<12}  {}\n",
        "Created",
        "Action",
        "Type",
        "Object",
        "By",
        "Changes",
        type_width = type_width,
        id_width = id_width,
    ));

    output.push_str(&format!(
        "{:-<23}  {:-<6}  {:-<type_width$}  {:-<id_width$}  {:-<12}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        type_width = type_width,
        id_width = id_width,
    ));

    for record in records {
        let created = record
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());

        let changes = match record.action {
            Action::Update => match record.diff() {
                Ok(Some(diff)) => diff.summary(),
                Ok(None) => "(no diff)".to_string(),
                Err(_) => "(unreadable diff)".to_string(),
            },
            _ => String::new(),
        };

        output.push_str(&format!(
            "{:<23}  {:<6}  {:<type_width$}  {:<id_width$}  {:<12}  {}\n",
            created,
            record.action.as_str(),
            record.object_type,
            record.object_id,
            truncate(&record.actor().name, 12),
            changes,
            type_width = type_width,
            id_width = id_width,
        ));
    }

    output
}

/// Format one record with its full state, diff and metadata
pub fn format_record_detail(record: &ChangeLog) -> String {
    let actor = record.actor();
    let mut output = String::new();

    output.push_str(&format!("Change log {}\n", record.id));
    output.push_str(&format!("  Action:  {}\n", record.action));
    output.push_str(&format!("  Object:  {} {}\n", record.object_type, record.object_id));
    output.push_str(&format!(
        "  By:      {} (id: {}, class: {})\n",
        actor.name, actor.id, actor.class
    ));
    if let Some(at) = record.created_at {
        output.push_str(&format!("  Created: {}\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }

    if let Ok(Some(diff)) = record.diff() {
        output.push_str("\nChanges:\n");
        for line in diff.detailed() {
            output.push_str(&format!("  {}\n", line));
        }
    }

    if let Ok(Some(meta)) = record.meta() {
        output.push_str(&format!("\nMeta:\n  {}\n", meta));
    }

    output.push_str("\nObject:\n");
    match record
        .object()
        .and_then(|o| serde_json::to_string_pretty(&o).map_err(Into::into))
    {
        Ok(pretty) => {
            for line in pretty.lines() {
                output.push_str(&format!("  {}\n", line));
            }
        }
        Err(_) => output.push_str(&format!("  {}\n", record.raw_object)),
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
