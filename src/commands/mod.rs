//! Command implementations for the Windlass CLI.
//!
//! Each command loads the snapshot, runs the resolver, and returns a result
//! struct implementing [`Output`] so `main` can print JSON or prose.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::config::Config;
use crate::models::recurrence::{self, NextValues};
use crate::models::score::{self, ScoreBreakdown, ScoreInputs};
use crate::models::{BlockReason, EligibilityResult, TaskRecord};
use crate::resolver::Resolver;
use crate::store::SnapshotStore;
use crate::{Error, Result, cli};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_of<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

/// One ranked task line.
#[derive(Debug, Clone, Serialize)]
pub struct TaskLine {
    pub id: String,
    pub title: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub star: bool,
}

impl TaskLine {
    fn from_result(result: &EligibilityResult) -> Self {
        Self {
            id: result.id.clone(),
            title: result.title.clone(),
            score: result.score,
            due: result.due,
            star: result.star,
        }
    }

    fn human_line(&self) -> String {
        let mut line = format!("{:>8.3}  {}  {}", self.score, self.id, self.title);
        if self.star {
            line.push_str("  *");
        }
        if let Some(due) = self.due {
            let _ = write!(line, "  (due {})", due.format("%Y-%m-%d %H:%M"));
        }
        line
    }
}

/// Result of `wl ready`.
#[derive(Debug, Serialize)]
pub struct ReadyResult {
    pub count: usize,
    pub tasks: Vec<TaskLine>,
}

impl Output for ReadyResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.tasks.is_empty() {
            return "No tasks are ready.".to_string();
        }
        let mut out = format!("{} task(s) ready:\n", self.count);
        for task in &self.tasks {
            out.push_str(&task.human_line());
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

/// One blocked task with its reasons.
#[derive(Debug, Serialize)]
pub struct BlockedLine {
    pub id: String,
    pub title: String,
    pub reasons: Vec<BlockReason>,
}

/// Result of `wl blocked`.
#[derive(Debug, Serialize)]
pub struct BlockedResult {
    pub count: usize,
    pub tasks: Vec<BlockedLine>,
}

impl Output for BlockedResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.tasks.is_empty() {
            return "Nothing is blocked.".to_string();
        }
        let mut out = format!("{} task(s) blocked:\n", self.count);
        for task in &self.tasks {
            let reasons: Vec<String> = task.reasons.iter().map(|r| r.to_string()).collect();
            let _ = writeln!(out, "{}  {}  [{}]", task.id, task.title, reasons.join(", "));
        }
        out.trim_end().to_string()
    }
}

/// Result of `wl rank`.
#[derive(Debug, Serialize)]
pub struct RankResult {
    pub count: usize,
    pub ranking: Vec<TaskLine>,
}

impl Output for RankResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.ranking.is_empty() {
            return "No actionable tasks to rank.".to_string();
        }
        let mut out = String::new();
        for (position, task) in self.ranking.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. {}", position + 1, task.human_line());
        }
        out.trim_end().to_string()
    }
}

/// Result of `wl score`.
#[derive(Debug, Serialize)]
pub struct ScoreResult {
    pub id: String,
    pub title: String,
    pub breakdown: ScoreBreakdown,
}

impl Output for ScoreResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "{}  {}\n  importance {:>7.3}\n  urgency    {:>7.3}\n  due        {:>7.3}\n  start      {:>7.3}\n  context    {:>7.3}\n  score      {:>7.3}",
            self.id,
            self.title,
            self.breakdown.importance,
            self.breakdown.urgency,
            self.breakdown.due_factor,
            self.breakdown.start_factor,
            self.breakdown.context_factor,
            self.breakdown.total,
        )
    }
}

/// Result of `wl next`.
#[derive(Debug, Serialize)]
pub struct NextResult {
    pub id: String,
    pub next: Option<NextValues>,
}

impl Output for NextResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        match &self.next {
            None => format!("{}: no further occurrence", self.id),
            Some(next) => {
                let mut out = format!("{}: occurrence {}", self.id, next.occurrence);
                if let Some(start) = next.start_time {
                    let _ = write!(out, ", start {}", start.format("%Y-%m-%d %H:%M"));
                }
                if let Some(end) = next.end_time {
                    let _ = write!(out, ", due {}", end.format("%Y-%m-%d %H:%M"));
                }
                out
            }
        }
    }
}

/// Result of `wl show`.
#[derive(Debug, Serialize)]
pub struct ShowResult {
    pub record: TaskRecord,
    pub actionable: bool,
    pub reasons: Vec<BlockReason>,
    pub score: f64,
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let state = if self.actionable {
            "actionable".to_string()
        } else {
            let reasons: Vec<String> = self.reasons.iter().map(|r| r.to_string()).collect();
            format!("blocked [{}]", reasons.join(", "))
        };
        format!(
            "{}  {}\n  status: {}{}\n  score:  {:.3}\n  state:  {}",
            self.record.id,
            self.record.title,
            self.record.status,
            if self.record.canceled { " (canceled)" } else { "" },
            self.score,
            state,
        )
    }
}

/// Result of `wl graph components`.
#[derive(Debug, Serialize)]
pub struct ComponentsResult {
    pub task_count: usize,
    pub component_count: usize,
    pub cycle_count: usize,
    pub cycles: Vec<Vec<String>>,
}

impl Output for ComponentsResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "{} task(s), {} component(s), {} cycle(s)",
            self.task_count, self.component_count, self.cycle_count
        );
        for cycle in &self.cycles {
            let _ = write!(out, "\n  cycle: {}", cycle.join(" -> "));
        }
        out
    }
}

/// Result of `wl build-info`.
#[derive(Debug, Serialize)]
pub struct BuildInfoResult {
    pub version: &'static str,
    pub commit: &'static str,
    pub built: &'static str,
}

impl Output for BuildInfoResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Version: {}\nCommit:  {}\nBuilt:   {}",
            self.version, self.commit, self.built
        )
    }
}

fn load(snapshot: &Path) -> Result<SnapshotStore> {
    SnapshotStore::load(snapshot)
}

/// `wl ready`: actionable tasks, ranked.
pub fn ready(
    snapshot: &Path,
    config: &Config,
    tag: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ReadyResult> {
    let store = load(snapshot)?;
    let resolver = Resolver::new(config.clone());
    let results = resolver.eligibility(&store, None, tag, false, now);
    let ranked = score::rank_actionable(results, now);
    Ok(ReadyResult {
        count: ranked.len(),
        tasks: ranked.iter().map(TaskLine::from_result).collect(),
    })
}

/// `wl blocked`: open tasks with at least one blocking reason.
pub fn blocked(
    snapshot: &Path,
    config: &Config,
    tag: Option<&str>,
    now: DateTime<Utc>,
) -> Result<BlockedResult> {
    let store = load(snapshot)?;
    let resolver = Resolver::new(config.clone());
    let results = resolver.eligibility(&store, None, tag, false, now);
    let tasks: Vec<BlockedLine> = results
        .into_iter()
        .filter(|r| !r.actionable)
        .map(|r| BlockedLine {
            id: r.id,
            title: r.title,
            reasons: r.reasons,
        })
        .collect();
    Ok(BlockedResult {
        count: tasks.len(),
        tasks,
    })
}

/// `wl rank`: every actionable task with its score, best first.
pub fn rank(
    snapshot: &Path,
    config: &Config,
    tag: Option<&str>,
    now: DateTime<Utc>,
) -> Result<RankResult> {
    let ready = ready(snapshot, config, tag, now)?;
    Ok(RankResult {
        count: ready.count,
        ranking: ready.tasks,
    })
}

/// `wl score <id>`: one task's score with the term breakdown.
pub fn score_task(
    snapshot: &Path,
    config: &Config,
    id: &str,
    now: DateTime<Utc>,
) -> Result<ScoreResult> {
    let store = load(snapshot)?;
    let resolver = Resolver::new(config.clone());
    let resolution = resolver.resolve(&store, None, now);
    let record = resolution
        .record(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let graph = config
        .weights
        .graph_aware
        .then(|| crate::resolver::compute_graph_factors(&resolution.records, &resolution.order, now))
        .and_then(|factors| factors.get(id).copied());
    let inputs = ScoreInputs {
        importance: record.importance,
        urgency: record.urgency,
        start_time: record.start_time,
        end_time: record.end_time,
        graph,
    };
    Ok(ScoreResult {
        id: record.id.clone(),
        title: record.title.clone(),
        breakdown: score::breakdown(&inputs, &config.weights, now),
    })
}

/// `wl next <id>`: the task's next occurrence, as if completed now.
pub fn next_occurrence(
    snapshot: &Path,
    config: &Config,
    id: &str,
    now: DateTime<Utc>,
) -> Result<NextResult> {
    let store = load(snapshot)?;
    let resolver = Resolver::new(config.clone());
    let resolution = resolver.resolve(&store, None, now);
    let record = resolution
        .record(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let next = record
        .recurrence_rule
        .as_deref()
        .and_then(recurrence::parse_rule)
        .and_then(|rule| {
            recurrence::next_recurrence(
                record.status,
                crate::models::TaskStatus::Done,
                &rule,
                record.start_time,
                record.end_time,
                now,
            )
        });
    Ok(NextResult {
        id: record.id.clone(),
        next,
    })
}

/// `wl show <id>`: normalized record plus verdict.
pub fn show(
    snapshot: &Path,
    config: &Config,
    id: &str,
    now: DateTime<Utc>,
) -> Result<ShowResult> {
    let store = load(snapshot)?;
    let resolver = Resolver::new(config.clone());
    let resolution = resolver.resolve(&store, None, now);
    let record = resolution
        .record(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?
        .clone();
    let result = resolution
        .result(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    Ok(ShowResult {
        record,
        actionable: result.actionable,
        reasons: result.reasons.clone(),
        score: result.score,
    })
}

/// `wl graph components`: SCC report over the dependency graph.
pub fn graph_components(
    snapshot: &Path,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<ComponentsResult> {
    let store = load(snapshot)?;
    let resolver = Resolver::new(config.clone());
    let resolution = resolver.resolve(&store, None, now);
    let cycles = resolution.cycles.cycles();
    Ok(ComponentsResult {
        task_count: resolution.order.len(),
        component_count: resolution.cycles.component_count(),
        cycle_count: cycles.len(),
        cycles,
    })
}

/// `wl build-info`.
pub fn build_info() -> BuildInfoResult {
    BuildInfoResult {
        version: cli::package_version(),
        commit: cli::git_commit(),
        built: cli::build_timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write as _;

    fn write_snapshot(content: serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.to_string().as_bytes()).unwrap();
        file
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ready_ranks_and_excludes_blocked() {
        let file = write_snapshot(json!({
            "nodes": [
                {"id": "a", "text": "Free task", "tags": ["task"],
                 "props": {"status": "todo", "importance": 90}},
                {"id": "b", "text": "Blocked task", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["c"]}},
                {"id": "c", "text": "Open dep", "tags": ["task"],
                 "props": {"status": "doing"}}
            ]
        }));
        let result = ready(file.path(), &Config::default(), None, now()).unwrap();
        let ids: Vec<&str> = result.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(result.tasks[0].score > result.tasks[1].score);
    }

    #[test]
    fn test_blocked_lists_reasons() {
        let file = write_snapshot(json!({
            "nodes": [
                {"id": "a", "text": "Blocked", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["b"]}},
                {"id": "b", "text": "Dep", "tags": ["task"],
                 "props": {"status": "todo"}}
            ]
        }));
        let result = blocked(file.path(), &Config::default(), None, now()).unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.tasks[0].id, "a");
        assert_eq!(result.tasks[0].reasons, vec![BlockReason::DependencyUnmet]);
    }

    #[test]
    fn test_score_breakdown_matches_worked_example() {
        let file = write_snapshot(json!({
            "nodes": [
                {"id": "a", "text": "T", "tags": ["task"],
                 "props": {"status": "todo", "importance": 80, "urgency": 60}}
            ]
        }));
        let result = score_task(file.path(), &Config::default(), "a", now()).unwrap();
        assert_eq!(result.breakdown.total, 69.0);
        assert_eq!(result.breakdown.due_factor, 35.0);
        assert_eq!(result.breakdown.start_factor, 100.0);
    }

    #[test]
    fn test_next_and_termination() {
        let file = write_snapshot(json!({
            "nodes": [
                {"id": "a", "text": "Weekly", "tags": ["task"],
                 "props": {"status": "todo", "due": "2026-03-01T09:00:00Z",
                           "repeat": "every week"}},
                {"id": "b", "text": "Spent", "tags": ["task"],
                 "props": {"status": "todo",
                           "repeat": {"unit": "day", "maxCount": 3, "occurrence": 3}}}
            ]
        }));
        let next = next_occurrence(file.path(), &Config::default(), "a", now()).unwrap();
        let due = next.next.unwrap().end_time.unwrap();
        assert!(due > now());

        let spent = next_occurrence(file.path(), &Config::default(), "b", now()).unwrap();
        assert!(spent.next.is_none());
        assert!(spent.to_json().contains("\"next\":null"));
    }

    #[test]
    fn test_graph_components_reports_cycle() {
        let file = write_snapshot(json!({
            "nodes": [
                {"id": "a", "text": "A", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["b"]}},
                {"id": "b", "text": "B", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["a"]}},
                {"id": "c", "text": "C", "tags": ["task"], "props": {"status": "todo"}}
            ]
        }));
        let result = graph_components(file.path(), &Config::default(), now()).unwrap();
        assert_eq!(result.task_count, 3);
        assert_eq!(result.component_count, 2);
        assert_eq!(result.cycle_count, 1);
        assert_eq!(result.cycles[0], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_show_unknown_id_is_not_found() {
        let file = write_snapshot(json!({"nodes": []}));
        let err = show(file.path(), &Config::default(), "ghost", now()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
