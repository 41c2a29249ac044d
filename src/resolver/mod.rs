//! The eligibility resolver.
//!
//! Composes the snapshot reader, cycle detector, hierarchy indexer, and
//! dependency evaluator into a single pass that classifies every task as
//! actionable or blocked, with the full list of blocking reasons. The pass
//! reads a point-in-time snapshot: concurrent store mutations are picked up
//! by the *next* pass, never mid-flight. Per-node store failures are logged
//! and degrade to "node absent"; the pass itself always completes.

pub mod cache;
pub mod deps;
pub mod hierarchy;

pub use cache::EvalCache;
pub use deps::DependencyContext;
pub use hierarchy::HierarchyIndex;

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::Config;
use crate::models::graph::CycleIndex;
use crate::models::score::{self, GraphFactors, ScoreInputs};
use crate::models::{BlockReason, DependencyVerdict, EligibilityResult, TaskRecord};
use crate::store::{AliasMap, NodeSource, lookup, reader};

/// Everything one resolution pass produced. Commands that need more than
/// the verdict list (score breakdowns, component reports, single-task
/// views) read it from here instead of re-running the graph work.
pub struct Resolution {
    /// Normalized records, keyed by canonical id.
    pub records: HashMap<String, TaskRecord>,

    /// Canonical ids in snapshot order.
    pub order: Vec<String>,

    /// Strongly-connected components of the dependency graph.
    pub cycles: CycleIndex,

    /// Parent/children maps.
    pub hierarchy: HierarchyIndex,

    /// One verdict per task, in `order`.
    pub results: Vec<EligibilityResult>,
}

impl Resolution {
    pub fn record(&self, id: &str) -> Option<&TaskRecord> {
        self.records.get(id)
    }

    pub fn result(&self, id: &str) -> Option<&EligibilityResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

/// The composed eligibility resolver.
pub struct Resolver {
    config: Config,
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full resolution pass over every node carrying the task tag
    /// (or an explicit override tag).
    ///
    /// Never fails: a failing batch query yields an empty pass, a failing
    /// node lookup is treated as absent.
    pub fn resolve(
        &self,
        source: &dyn NodeSource,
        tag: Option<&str>,
        now: DateTime<Utc>,
    ) -> Resolution {
        let schema = &self.config.schema;
        let tag = tag.unwrap_or(&schema.task_tag);

        let nodes = match source.tagged(tag) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::warn!(tag, error = %err, "tag query failed; resolving empty snapshot");
                Vec::new()
            }
        };

        // Identity first: every reference below goes through the alias map.
        let aliases = AliasMap::build(&nodes);

        let mut records: HashMap<String, TaskRecord> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for node in &nodes {
            let canonical = aliases.resolve(&node.id).to_string();
            if records.contains_key(&canonical) {
                continue;
            }
            let record = if canonical == node.id {
                reader::read_task(node, schema, source)
            } else {
                // A mirrored view: read the canonical node instead.
                match lookup(source, &canonical) {
                    Some(real) => reader::read_task(&real, schema, source),
                    None => continue,
                }
            };
            order.push(canonical.clone());
            records.insert(canonical, record);
        }

        // Canonicalize dependency references now that the alias map exists.
        for record in records.values_mut() {
            let mut deps: Vec<String> = Vec::new();
            for dep in &record.depends_on {
                let canonical = aliases.resolve(dep).to_string();
                if canonical != record.id && !deps.contains(&canonical) {
                    deps.push(canonical);
                }
            }
            record.depends_on = deps;
        }

        let adjacency: HashMap<String, Vec<String>> = records
            .values()
            .map(|r| (r.id.clone(), r.depends_on.clone()))
            .collect();
        let cycles = CycleIndex::build(&adjacency);

        let hierarchy = HierarchyIndex::build(&records, source, &aliases);

        // Settle the hierarchy view on the records themselves.
        for id in &order {
            let parent = hierarchy.parent(id).map(String::from);
            let children = hierarchy.children(id).to_vec();
            if let Some(record) = records.get_mut(id) {
                record.parent_id = parent;
                record.child_ids = children;
            }
        }

        let ctx = DependencyContext {
            records: &records,
            hierarchy: &hierarchy,
            cycles: &cycles,
        };
        let verdicts: HashMap<&str, DependencyVerdict> = order
            .iter()
            .map(|id| (id.as_str(), deps::evaluate(&records[id], &ctx, now)))
            .collect();

        let graph_factors = if self.config.weights.graph_aware {
            Some(compute_graph_factors(&records, &order, now))
        } else {
            None
        };

        let mut results = Vec::with_capacity(order.len());
        for id in &order {
            let record = &records[id];
            let mut reasons = Vec::new();

            if record.status.is_terminal() {
                reasons.push(BlockReason::Completed);
            }
            if record.canceled {
                reasons.push(BlockReason::Canceled);
            }
            if record.start_time.is_some_and(|start| start > now) {
                reasons.push(BlockReason::NotStarted);
            }
            if hierarchy.has_open_descendant(id, &records) {
                reasons.push(BlockReason::HasOpenChildren);
            }
            let ancestor_blocked = hierarchy.ancestors(id).iter().any(|ancestor| {
                verdicts
                    .get(ancestor.as_str())
                    .is_some_and(|v| !v.is_satisfied())
            });
            if ancestor_blocked {
                reasons.push(BlockReason::AncestorDependencyUnmet);
            }
            match verdicts[id.as_str()] {
                DependencyVerdict::Unmet => reasons.push(BlockReason::DependencyUnmet),
                DependencyVerdict::Delayed => reasons.push(BlockReason::DependencyDelayed),
                DependencyVerdict::Satisfied => {}
            }

            // Review-enabled tasks can be configured to surface regardless
            // of blocks; the reasons stay listed for diagnostics.
            let actionable = reasons.is_empty()
                || (self.config.resolver.surface_reviewed && record.review_enabled);

            let inputs = ScoreInputs {
                importance: record.importance,
                urgency: record.urgency,
                start_time: record.start_time,
                end_time: record.end_time,
                graph: graph_factors
                    .as_ref()
                    .and_then(|factors| factors.get(id.as_str()).copied()),
            };
            let score = score::compute_score(&inputs, &self.config.weights, now);

            results.push(EligibilityResult {
                id: id.clone(),
                title: record.title.clone(),
                reasons,
                actionable,
                score,
                due: record.end_time,
                star: record.star,
            });
        }

        Resolution {
            records,
            order,
            cycles,
            hierarchy,
            results,
        }
    }

    /// Cached eligibility view: serve a live cache entry when one exists,
    /// otherwise run a pass and memoize it. `include_completed` keeps or
    /// drops closed tasks from the view and participates in the cache key.
    pub fn eligibility(
        &self,
        source: &dyn NodeSource,
        cache: Option<&EvalCache>,
        tag: Option<&str>,
        include_completed: bool,
        now: DateTime<Utc>,
    ) -> Vec<EligibilityResult> {
        let tag_key = tag.unwrap_or(&self.config.schema.task_tag).to_string();
        if let Some(cache) = cache {
            if let Some(hit) = cache.get(&tag_key, include_completed, now) {
                return hit;
            }
        }

        let resolution = self.resolve(source, tag, now);
        let results: Vec<EligibilityResult> = resolution
            .results
            .into_iter()
            .filter(|r| {
                include_completed
                    || resolution
                        .records
                        .get(&r.id)
                        .is_none_or(|record| !record.is_closed())
            })
            .collect();

        if let Some(cache) = cache {
            cache.put(&tag_key, include_completed, now, results.clone());
        }
        results
    }
}

/// Demand, dependent counts, and wait time for the graph-aware scoring
/// variant: one reverse-adjacency BFS per task, visited-set guarded so
/// cycles terminate.
pub(crate) fn compute_graph_factors(
    records: &HashMap<String, TaskRecord>,
    order: &[String],
    now: DateTime<Utc>,
) -> HashMap<String, GraphFactors> {
    let mut reverse: HashMap<&str, Vec<&str>> = HashMap::new();
    for record in records.values() {
        for dep in &record.depends_on {
            reverse
                .entry(dep.as_str())
                .or_default()
                .push(record.id.as_str());
        }
    }

    let mut factors = HashMap::new();
    for id in order {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id.as_str());
        let mut queue: VecDeque<&str> = reverse
            .get(id.as_str())
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default();
        let mut dependents: Vec<&str> = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            dependents.push(current);
            if let Some(next) = reverse.get(current) {
                for n in next {
                    if !seen.contains(n) {
                        queue.push_back(n);
                    }
                }
            }
        }

        let demand = if dependents.is_empty() {
            0.0
        } else {
            dependents
                .iter()
                .map(|d| {
                    records
                        .get(*d)
                        .and_then(|r| r.importance)
                        .unwrap_or(50.0)
                })
                .sum::<f64>()
                / dependents.len() as f64
        };

        let waiting_days = records
            .get(id)
            .and_then(|r| r.updated_at)
            .map(|touched| ((now - touched).num_seconds() as f64 / 86_400.0).max(0.0))
            .unwrap_or(0.0);

        factors.insert(
            id.clone(),
            GraphFactors {
                demand,
                dependents: dependents.len(),
                waiting_days,
            },
        );
    }
    factors
}
