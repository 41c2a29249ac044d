//! Data models for Windlass entities.
//!
//! This module defines the core data structures:
//! - `TaskRecord` - a normalized task snapshot with status, time fields,
//!   dependency fields, review fields, and hierarchy pointers
//! - `BlockReason` - why a task is not currently actionable
//! - `EligibilityResult` - the per-task verdict produced by the resolver
//! - `DependencyVerdict` - the outcome of evaluating a dependency list

pub mod graph;
pub mod recurrence;
pub mod score;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status in the workflow.
///
/// The four states are ordered by progress. A separately-recognized
/// "canceled" marker lives on [`TaskRecord::canceled`] because outline
/// stores usually model cancellation as a label on top of the base status
/// rather than a fifth state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Waiting,
    Done,
}

impl TaskStatus {
    /// Returns true if this status is terminal for blocking purposes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Waiting => "waiting",
            TaskStatus::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Satisfaction mode over a dependency list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependsMode {
    /// Every dependency must be complete.
    #[default]
    All,
    /// At least one dependency must be complete.
    Any,
}

/// Review cadence for tasks under spaced review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    #[default]
    Single,
    Cycle,
}

/// A normalized task snapshot.
///
/// Records are rebuilt from the live store on every resolution pass and are
/// never mutated in place; updates flow back through the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Stable identity, already resolved through any mirror indirection.
    pub id: String,

    /// Task title (the node's text content).
    pub title: String,

    /// Nearest task ancestor, or None when the walk reaches the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Direct task children, in store order.
    #[serde(default)]
    pub child_ids: Vec<String>,

    /// Current status.
    #[serde(default)]
    pub status: TaskStatus,

    /// Canceled marker, terminal for blocking purposes.
    #[serde(default)]
    pub canceled: bool,

    /// Scheduled start, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Due time, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Task ids this task depends on, deduplicated, self-references removed.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// ALL/ANY satisfaction mode for `depends_on`.
    #[serde(default)]
    pub depends_mode: DependsMode,

    /// Hours to wait after dependency completion before the task opens.
    /// Zero means no delay.
    #[serde(default)]
    pub dependency_delay_hours: f64,

    /// Importance rating 0-100; None is treated as the neutral midpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,

    /// Urgency rating 0-100; None is treated as the neutral midpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<f64>,

    /// Whether this task is under active review.
    #[serde(default)]
    pub review_enabled: bool,

    /// Review cadence type.
    #[serde(default)]
    pub review_type: ReviewType,

    /// Next scheduled review, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<DateTime<Utc>>,

    /// Review interval in days, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_every: Option<f64>,

    /// Last completed review, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,

    /// Raw recurrence rule, parsed on demand by the recurrence engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,

    /// Star flag, used only by presentation.
    #[serde(default)]
    pub star: bool,

    /// Best-known completion time: an explicit completed-at field when the
    /// schema maps one, else last-modified, else created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Last time the store touched this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Create a bare record with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_id: None,
            child_ids: Vec::new(),
            status: TaskStatus::default(),
            canceled: false,
            start_time: None,
            end_time: None,
            depends_on: Vec::new(),
            depends_mode: DependsMode::default(),
            dependency_delay_hours: 0.0,
            importance: None,
            urgency: None,
            review_enabled: false,
            review_type: ReviewType::default(),
            next_review_at: None,
            review_every: None,
            last_reviewed_at: None,
            recurrence_rule: None,
            star: false,
            completed_at: None,
            updated_at: None,
        }
    }

    /// Returns true if this task is closed (Done or canceled).
    pub fn is_closed(&self) -> bool {
        self.canceled || self.status.is_terminal()
    }
}

/// Why a task is not currently actionable.
///
/// Reasons are collected exhaustively rather than short-circuited so the
/// caller can show every block at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockReason {
    /// The task itself is Done.
    Completed,
    /// The task carries the canceled marker.
    Canceled,
    /// The start time lies in the future.
    NotStarted,
    /// Some descendant task is still open.
    HasOpenChildren,
    /// An ancestor task has an unsatisfied dependency set.
    AncestorDependencyUnmet,
    /// The task's own dependency set is not complete.
    DependencyUnmet,
    /// Dependencies are complete but the post-completion delay has not
    /// elapsed yet.
    DependencyDelayed,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockReason::Completed => "completed",
            BlockReason::Canceled => "canceled",
            BlockReason::NotStarted => "not-started",
            BlockReason::HasOpenChildren => "has-open-children",
            BlockReason::AncestorDependencyUnmet => "ancestor-dependency-unmet",
            BlockReason::DependencyUnmet => "dependency-unmet",
            BlockReason::DependencyDelayed => "dependency-delayed",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of evaluating one task's dependency list.
///
/// `Unmet` is a hard block, `Delayed` a soft one; the two are mutually
/// exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyVerdict {
    Satisfied,
    Unmet,
    Delayed,
}

impl DependencyVerdict {
    /// Returns true unless the verdict blocks the task.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, DependencyVerdict::Satisfied)
    }
}

/// Per-task verdict produced by the eligibility resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// Task id.
    pub id: String,

    /// Task title, for display.
    pub title: String,

    /// Every reason currently blocking the task, in evaluation order.
    pub reasons: Vec<BlockReason>,

    /// True iff `reasons` is empty, or the review override surfaced the
    /// task despite them.
    pub actionable: bool,

    /// Priority score per the scoring engine, for ranking.
    pub score: f64,

    /// Due time carried through for the ranking tie-break.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,

    /// Star flag carried through for presentation.
    #[serde(default)]
    pub star: bool,
}
