//! Field-level diffs between entity snapshots
//!
//! Diffs only cover an entity type's trackable fields, are keyed by the
//! snake_case field name and compare values by deep structural equality
//! of their JSON form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{to_snake_case, EntitySchema};

/// Old/new pair of one changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffObject {
    pub old: Value,
    pub new: Value,
}

/// Changed fields of one update, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateDiff(BTreeMap<String, DiffObject>);

impl UpdateDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, old: Value, new: Value) {
        self.0.insert(field.into(), DiffObject { old, new });
    }

    pub fn get(&self, field: &str) -> Option<&DiffObject> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DiffObject)> {
        self.0.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// One-line human-readable summary, e.g. `source: "a" -> "b"`
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, change)| {
                format!(
                    "{}: {} -> {}",
                    field,
                    format_value(&change.old),
                    format_value(&change.new)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Per-path change lines, descending into nested objects and arrays
    pub fn detailed(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, change)| describe_changes(&change.old, &change.new, field))
            .collect()
    }
}

/// Compute the diff between a prior snapshot and the current one
///
/// Returns `None` when no trackable field changed. A trackable field
/// missing from either snapshot is a schema misconfiguration; it is
/// logged and left out of the diff.
pub fn compute_diff(old: &Value, new: &Value, schema: &EntitySchema) -> Option<UpdateDiff> {
    let mut diff = UpdateDiff::new();

    for field in schema.fields() {
        let (Some(old_value), Some(new_value)) = (old.get(&field.key), new.get(&field.key)) else {
            tracing::error!(
                object_type = schema.object_type(),
                field = %field.key,
                "trackable field missing from snapshot, skipping"
            );
            continue;
        };

        if old_value != new_value {
            diff.insert(field.snake.clone(), old_value.clone(), new_value.clone());
        }
    }

    if diff.is_empty() {
        None
    } else {
        Some(diff)
    }
}

/// Structural equality of two snapshots on a field subset
///
/// An empty `fields` list compares the whole snapshots. Field names match
/// either the serialized key or its snake_case form.
pub fn is_equal(recorded: &Value, current: &Value, fields: &[String]) -> bool {
    if fields.is_empty() {
        return recorded == current;
    }

    fields
        .iter()
        .all(|name| lookup_field(recorded, name) == lookup_field(current, name))
}

fn lookup_field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    if let Some(found) = value.get(name) {
        return Some(found);
    }

    let wanted = to_snake_case(name);
    value
        .as_object()?
        .iter()
        .find(|(key, _)| to_snake_case(key) == wanted)
        .map(|(_, v)| v)
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let truncated: String = s.chars().take(47).collect();
                format!("\"{}...\"", truncated)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

fn describe_changes(before: &Value, after: &Value, prefix: &str) -> Vec<String> {
    let mut changes = Vec::new();

    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            for (key, before_val) in before_obj {
                let path = format!("{}.{}", prefix, key);
                match after_obj.get(key) {
                    Some(after_val) if before_val != after_val => {
                        changes.extend(describe_changes(before_val, after_val, &path));
                    }
                    Some(_) => {}
                    None => changes.push(format!(
                        "{}: {} -> (removed)",
                        path,
                        format_value(before_val)
                    )),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(format!(
                        "{}.{}: (added) -> {}",
                        prefix,
                        key,
                        format_value(after_val)
                    ));
                }
            }
        }
        (Value::Array(before_arr), Value::Array(after_arr))
            if before_arr.len() == after_arr.len() =>
        {
            for (i, (b, a)) in before_arr.iter().zip(after_arr.iter()).enumerate() {
                if b != a {
                    changes.extend(describe_changes(b, a, &format!("{}[{}]", prefix, i)));
                }
            }
        }
        _ => {
            if before != after {
                changes.push(format!(
                    "{}: {} -> {}",
                    prefix,
                    format_value(before),
                    format_value(after)
                ));
            }
        }
    }

    changes
}
