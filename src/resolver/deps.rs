//! Dependency satisfaction with ALL/ANY modes and completion delay.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::models::graph::CycleIndex;
use crate::models::{DependencyVerdict, DependsMode, TaskRecord};
use crate::resolver::hierarchy::HierarchyIndex;

/// Shared lookup context for dependency evaluation.
pub struct DependencyContext<'a> {
    pub records: &'a HashMap<String, TaskRecord>,
    pub hierarchy: &'a HierarchyIndex,
    pub cycles: &'a CycleIndex,
}

/// One surviving dependency reference.
struct Entry {
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

/// Evaluate a task's dependency list.
///
/// Per reference: self-references are dropped, cycle-internal edges are
/// dropped (a defused cycle never blocks), unresolved targets count as
/// incomplete, and a resolved target counts as completed only when it is
/// Done *and* its whole subtree is closed. An empty surviving list is
/// trivially satisfied. When completion-satisfied and a delay is
/// configured, the window anchors on the earliest completion for ANY mode
/// and the latest for ALL mode.
pub fn evaluate(
    record: &TaskRecord,
    ctx: &DependencyContext<'_>,
    now: DateTime<Utc>,
) -> DependencyVerdict {
    let mut entries: Vec<Entry> = Vec::new();

    for dep in &record.depends_on {
        if dep == &record.id {
            continue;
        }
        if ctx.cycles.edge_in_cycle(&record.id, dep) {
            continue;
        }
        match ctx.records.get(dep) {
            None => entries.push(Entry {
                completed: false,
                completed_at: None,
            }),
            Some(target) => {
                let completed = target.status.is_terminal()
                    && !ctx.hierarchy.has_open_descendant(&target.id, ctx.records);
                entries.push(Entry {
                    completed,
                    completed_at: target.completed_at,
                });
            }
        }
    }

    if entries.is_empty() {
        return DependencyVerdict::Satisfied;
    }

    let satisfied = match record.depends_mode {
        DependsMode::Any => entries.iter().any(|e| e.completed),
        DependsMode::All => entries.iter().all(|e| e.completed),
    };
    if !satisfied {
        return DependencyVerdict::Unmet;
    }

    if record.dependency_delay_hours <= 0.0 {
        return DependencyVerdict::Satisfied;
    }

    let completions = entries
        .iter()
        .filter(|e| e.completed)
        .filter_map(|e| e.completed_at);
    let anchor = match record.depends_mode {
        // Available as soon as the first qualifying dependency clears its
        // delay.
        DependsMode::Any => completions.min(),
        // The window only opens once every required dependency is done.
        DependsMode::All => completions.max(),
    };
    let Some(anchor) = anchor else {
        // No usable completion timestamps: nothing to anchor a delay on.
        return DependencyVerdict::Satisfied;
    };

    let delay_ms = (record.dependency_delay_hours * 3_600_000.0).round() as i64;
    if now < anchor + Duration::milliseconds(delay_ms) {
        DependencyVerdict::Delayed
    } else {
        DependencyVerdict::Satisfied
    }
}
