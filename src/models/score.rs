//! Priority scoring for tasks.
//!
//! A pure function from normalized priority and time inputs to a 0-100
//! score, plus the total ordering used to rank actionable tasks. No store
//! access happens here; graph-derived inputs are computed by the resolver
//! and passed in.
//!
//! # Example
//!
//! ```
//! use windlass::models::score::{compute_score, ScoreInputs, ScoreWeights};
//! use chrono::Utc;
//!
//! let inputs = ScoreInputs {
//!     importance: Some(80.0),
//!     urgency: Some(60.0),
//!     ..Default::default()
//! };
//! let score = compute_score(&inputs, &ScoreWeights::default(), Utc::now());
//! assert_eq!(score, 69.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::EligibilityResult;

/// Fixed curve parameters for the time factors.
pub mod curve {
    /// Days ahead within which a due date starts raising the score.
    pub const DUE_HORIZON_DAYS: f64 = 14.0;

    /// Due factor at the far edge of the horizon.
    pub const DUE_FLOOR: f64 = 40.0;

    /// Due factor when the task has no due date at all.
    pub const NO_DUE_DEFAULT: f64 = 35.0;

    /// Days ahead within which an upcoming start ramps the start factor.
    pub const START_HORIZON_DAYS: f64 = 14.0;

    /// Saturation constant for the dependent-count curve.
    pub const DEPENDENT_SATURATION: f64 = 5.0;
}

/// Weights for the scoring terms.
///
/// The defaults reproduce the documented weighted sum: importance 0.40,
/// urgency 0.25, due proximity 0.20, start proximity 0.10, context 0.05.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub importance: f64,
    pub urgency: f64,
    pub due: f64,
    pub start: f64,
    pub context: f64,

    /// When set, the context term blends dependency demand, dependent
    /// count, and wait time instead of the flat baseline.
    pub graph_aware: bool,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            importance: 0.40,
            urgency: 0.25,
            due: 0.20,
            start: 0.10,
            context: 0.05,
            graph_aware: false,
        }
    }
}

/// Dependency-graph-derived inputs for the richer scoring variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFactors {
    /// Mean priority (0-100) of the tasks transitively depending on this
    /// one; zero when nothing depends on it.
    pub demand: f64,

    /// Number of tasks transitively depending on this one.
    pub dependents: usize,

    /// Days since the task was last touched.
    pub waiting_days: f64,
}

/// Inputs to the scoring function.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs {
    /// Importance 0-100; None is the neutral midpoint.
    pub importance: Option<f64>,

    /// Urgency 0-100; None is the neutral midpoint.
    pub urgency: Option<f64>,

    /// Scheduled start, if any.
    pub start_time: Option<DateTime<Utc>>,

    /// Due time, if any.
    pub end_time: Option<DateTime<Utc>>,

    /// Graph-derived factors; only consulted when `graph_aware` is set.
    pub graph: Option<GraphFactors>,
}

/// Per-term breakdown, surfaced by `wl score` for explainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub importance: f64,
    pub urgency: f64,
    pub due_factor: f64,
    pub start_factor: f64,
    pub context_factor: f64,
    pub total: f64,
}

/// Compute the priority score, clamped to [0, 100] and rounded to three
/// decimals so equal inputs always order identically.
pub fn compute_score(inputs: &ScoreInputs, weights: &ScoreWeights, now: DateTime<Utc>) -> f64 {
    breakdown(inputs, weights, now).total
}

/// Compute the score together with its term breakdown.
pub fn breakdown(inputs: &ScoreInputs, weights: &ScoreWeights, now: DateTime<Utc>) -> ScoreBreakdown {
    let importance = normalize_rating(inputs.importance);
    let urgency = normalize_rating(inputs.urgency);
    let due_factor = due_factor(inputs.end_time, now);
    let start_factor = start_factor(inputs.start_time, now);
    let context_factor = if weights.graph_aware {
        graph_context(inputs.graph.as_ref())
    } else {
        100.0
    };

    let total = importance * weights.importance
        + urgency * weights.urgency
        + due_factor * weights.due
        + start_factor * weights.start
        + context_factor * weights.context;

    ScoreBreakdown {
        importance,
        urgency,
        due_factor,
        start_factor,
        context_factor,
        total: round3(total.clamp(0.0, 100.0)),
    }
}

/// Clamp a 0-100 rating, mapping absent or non-finite values to the
/// neutral midpoint.
fn normalize_rating(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 50.0,
    }
}

/// Due-proximity factor: overdue is maximal, otherwise a linear ramp from
/// the floor up to 100 as the due date approaches within the horizon.
fn due_factor(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(due) = due else {
        return curve::NO_DUE_DEFAULT;
    };
    let days_left = (due - now).num_seconds() as f64 / 86_400.0;
    if days_left <= 0.0 {
        return 100.0;
    }
    if days_left >= curve::DUE_HORIZON_DAYS {
        return curve::DUE_FLOOR;
    }
    curve::DUE_FLOOR + (100.0 - curve::DUE_FLOOR) * (1.0 - days_left / curve::DUE_HORIZON_DAYS)
}

/// Start-proximity factor: already startable is maximal, a future start
/// ramps toward 100 as it approaches within the horizon.
fn start_factor(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(start) = start else {
        return 100.0;
    };
    let days_until = (start - now).num_seconds() as f64 / 86_400.0;
    if days_until <= 0.0 {
        return 100.0;
    }
    if days_until >= curve::START_HORIZON_DAYS {
        return 0.0;
    }
    100.0 * (1.0 - days_until / curve::START_HORIZON_DAYS)
}

/// Context term for the graph-aware variant: demand dominates, dependent
/// count saturates exponentially so a task blocking many others is boosted
/// with diminishing returns, and a long-waiting task creeps upward.
fn graph_context(graph: Option<&GraphFactors>) -> f64 {
    let Some(graph) = graph else {
        return 100.0;
    };
    let demand = if graph.demand.is_finite() {
        graph.demand.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let dependents =
        100.0 * (1.0 - (-(graph.dependents as f64) / curve::DEPENDENT_SATURATION).exp());
    let waiting = if graph.waiting_days.is_finite() {
        (graph.waiting_days.max(0.0) * 10.0).min(100.0)
    } else {
        0.0
    };
    0.45 * demand + 0.35 * dependents + 0.20 * waiting
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Total order over eligibility results: overdue tasks first, then score
/// descending, then due time ascending (missing due sorts last), then id
/// ascending for full determinism.
pub fn compare_ranked(a: &EligibilityResult, b: &EligibilityResult, now: DateTime<Utc>) -> Ordering {
    let overdue = |r: &EligibilityResult| r.due.map(|d| d <= now).unwrap_or(false);
    overdue(b)
        .cmp(&overdue(a))
        .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        .then_with(|| {
            let due_a = a.due.map(|d| d.timestamp_millis()).unwrap_or(i64::MAX);
            let due_b = b.due.map(|d| d.timestamp_millis()).unwrap_or(i64::MAX);
            due_a.cmp(&due_b)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Filter to actionable results and sort per [`compare_ranked`].
pub fn rank_actionable(
    results: Vec<EligibilityResult>,
    now: DateTime<Utc>,
) -> Vec<EligibilityResult> {
    let mut actionable: Vec<EligibilityResult> =
        results.into_iter().filter(|r| r.actionable).collect();
    actionable.sort_by(|a, b| compare_ranked(a, b, now));
    actionable
}
