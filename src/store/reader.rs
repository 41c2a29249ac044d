//! Schema-aware extraction of [`TaskRecord`]s from raw nodes.
//!
//! All input normalization happens here: non-finite numbers, negative
//! delays, and out-of-range ratings are clamped to safe defaults at this
//! boundary instead of leaking into the scoring or scheduling math.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::FieldSchema;
use crate::models::{DependsMode, ReviewType, TaskRecord, TaskStatus};
use crate::store::{NodeSource, TaskNode};

/// Normalize one node into a record.
///
/// `parent_id` is carried over raw; the resolver replaces it with the
/// nearest *task* ancestor once the hierarchy index exists.
pub fn read_task(node: &TaskNode, schema: &FieldSchema, source: &dyn NodeSource) -> TaskRecord {
    let mut record = TaskRecord::new(node.id.clone(), node.text.clone());
    record.parent_id = node.parent.clone();
    record.child_ids = node
        .children
        .iter()
        .filter(|child| *child != &node.id)
        .cloned()
        .collect();

    let (status, canceled) = read_status(node, schema);
    record.status = status;
    record.canceled = canceled;

    record.start_time = prop_datetime(node, &schema.start);
    record.end_time = prop_datetime(node, &schema.due);

    record.depends_on = read_depends_on(node, schema, source);
    record.depends_mode = match prop_str(node, &schema.depends_mode).as_deref() {
        Some("any") => DependsMode::Any,
        _ => DependsMode::All,
    };
    record.dependency_delay_hours = prop_f64(node, &schema.delay_hours)
        .map(|v| v.max(0.0))
        .unwrap_or(0.0);

    record.importance = prop_f64(node, &schema.importance).map(|v| v.clamp(0.0, 100.0));
    record.urgency = prop_f64(node, &schema.urgency).map(|v| v.clamp(0.0, 100.0));

    record.review_enabled = prop_bool(node, &schema.review_enabled).unwrap_or(false);
    record.review_type = match prop_str(node, &schema.review_type).as_deref() {
        Some("cycle") => ReviewType::Cycle,
        _ => ReviewType::Single,
    };
    record.next_review_at = prop_datetime(node, &schema.next_review_at);
    record.review_every = prop_f64(node, &schema.review_every).map(|v| v.max(0.0));
    record.last_reviewed_at = prop_datetime(node, &schema.last_reviewed_at);

    record.recurrence_rule = read_rule(node, schema);
    record.star = prop_bool(node, &schema.star).unwrap_or(false);

    // Completion time: explicit field when mapped, else the store's
    // last-modified, else created.
    record.completed_at = prop_datetime(node, &schema.completed_at)
        .or(node.updated_at)
        .or(node.created_at);
    record.updated_at = node.updated_at.or(node.created_at);

    record
}

fn read_status(node: &TaskNode, schema: &FieldSchema) -> (TaskStatus, bool) {
    let Some(label) = prop_str(node, &schema.status) else {
        return (TaskStatus::Todo, false);
    };
    if schema
        .canceled_labels
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&label))
    {
        return (TaskStatus::Todo, true);
    }
    let labels = &schema.status_labels;
    let status = if label.eq_ignore_ascii_case(&labels.done) {
        TaskStatus::Done
    } else if label.eq_ignore_ascii_case(&labels.doing) {
        TaskStatus::Doing
    } else if label.eq_ignore_ascii_case(&labels.waiting) {
        TaskStatus::Waiting
    } else {
        TaskStatus::Todo
    };
    (status, false)
}

/// Dependency references, each resolved through the store's relation table,
/// deduplicated, and with direct self-references dropped.
fn read_depends_on(node: &TaskNode, schema: &FieldSchema, source: &dyn NodeSource) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in prop_str_list(node, &schema.depends_on) {
        let resolved = source.resolve_ref(&raw);
        if resolved == node.id {
            continue;
        }
        if !out.contains(&resolved) {
            out.push(resolved);
        }
    }
    out
}

fn read_rule(node: &TaskNode, schema: &FieldSchema) -> Option<String> {
    match node.prop(&schema.repeat) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        // A structured rule is carried as its JSON text; the recurrence
        // engine parses it on demand.
        Some(value @ Value::Object(_)) => Some(value.to_string()),
        _ => None,
    }
}

fn prop_str(node: &TaskNode, key: &str) -> Option<String> {
    match node.prop(key)? {
        Value::String(s) => Some(s.trim().to_lowercase()),
        _ => None,
    }
}

fn prop_f64(node: &TaskNode, key: &str) -> Option<f64> {
    let value = match node.prop(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn prop_bool(node: &TaskNode, key: &str) -> Option<bool> {
    match node.prop(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn prop_datetime(node: &TaskNode, key: &str) -> Option<DateTime<Utc>> {
    match node.prop(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            DateTime::<Utc>::from_timestamp_millis(millis as i64)
        }
        _ => None,
    }
}

fn prop_str_list(node: &TaskNode, key: &str) -> Vec<String> {
    match node.prop(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}
