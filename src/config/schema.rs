//! Field-name schema for reading tasks out of an outline store.
//!
//! Outline stores keep task data in free-form property bags, and different
//! hosts name the same fields differently. The schema makes that mapping an
//! explicit value passed into every reader call instead of burying string
//! keys inside the algorithms.

use serde::{Deserialize, Serialize};

/// Labels mapped onto the four workflow statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusLabels {
    pub todo: String,
    pub doing: String,
    pub waiting: String,
    pub done: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            todo: "todo".to_string(),
            doing: "doing".to_string(),
            waiting: "waiting".to_string(),
            done: "done".to_string(),
        }
    }
}

/// Property-key mapping for task fields.
///
/// Every key names an entry in the node's property bag. The defaults match
/// the snapshot fixtures used across the test suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
    /// Tag that marks a node as a task.
    pub task_tag: String,

    /// Status property key and the labels it may hold.
    pub status: String,
    pub status_labels: StatusLabels,

    /// Labels recognized as the canceled pseudo-status.
    pub canceled_labels: Vec<String>,

    /// Time fields.
    pub start: String,
    pub due: String,
    pub completed_at: String,

    /// Dependency fields.
    pub depends_on: String,
    pub depends_mode: String,
    pub delay_hours: String,

    /// Priority fields.
    pub importance: String,
    pub urgency: String,

    /// Review fields.
    pub review_enabled: String,
    pub review_type: String,
    pub next_review_at: String,
    pub review_every: String,
    pub last_reviewed_at: String,

    /// Recurrence rule field.
    pub repeat: String,

    /// Star flag field.
    pub star: String,
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            task_tag: "task".to_string(),
            status: "status".to_string(),
            status_labels: StatusLabels::default(),
            canceled_labels: vec!["canceled".to_string(), "cancelled".to_string()],
            start: "start".to_string(),
            due: "due".to_string(),
            completed_at: "completed_at".to_string(),
            depends_on: "depends_on".to_string(),
            depends_mode: "depends_mode".to_string(),
            delay_hours: "delay_hours".to_string(),
            importance: "importance".to_string(),
            urgency: "urgency".to_string(),
            review_enabled: "review_enabled".to_string(),
            review_type: "review_type".to_string(),
            next_review_at: "next_review_at".to_string(),
            review_every: "review_every".to_string(),
            last_reviewed_at: "last_reviewed_at".to_string(),
            repeat: "repeat".to_string(),
            star: "star".to_string(),
        }
    }
}
