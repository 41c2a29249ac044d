//! Hierarchy indexing: nearest task ancestors and open-subtask detection.
//!
//! Outline stores interleave tasks with plain container nodes, so a task's
//! raw parent pointer rarely points at another task. The index walks each
//! chain up through containers until it hits a known task, memoizing
//! container resolutions across the whole pass. Every walk here is
//! iterative and visited-set guarded; corrupted cyclic parent chains
//! degrade to "no ancestor found" instead of looping.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::TaskRecord;
use crate::store::{AliasMap, NodeSource, lookup};

/// Parent/children maps over the task set.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    parent_of: HashMap<String, Option<String>>,
    children_of: HashMap<String, Vec<String>>,
}

impl HierarchyIndex {
    /// Resolve the nearest task ancestor for every record and invert the
    /// result into per-task child lists (restricted to known task ids, in
    /// id order).
    pub fn build(
        records: &HashMap<String, TaskRecord>,
        source: &dyn NodeSource,
        aliases: &AliasMap,
    ) -> Self {
        let mut container_cache: HashMap<String, Option<String>> = HashMap::new();
        let mut parent_of: HashMap<String, Option<String>> = HashMap::new();

        let mut ids: Vec<&String> = records.keys().collect();
        ids.sort();

        for id in &ids {
            let record = &records[id.as_str()];
            let ancestor = nearest_task_ancestor(
                id,
                record.parent_id.as_deref(),
                records,
                source,
                aliases,
                &mut container_cache,
            );
            parent_of.insert((*id).clone(), ancestor);
        }

        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        for id in &ids {
            if let Some(Some(parent)) = parent_of.get(id.as_str()) {
                children_of
                    .entry(parent.clone())
                    .or_default()
                    .push((*id).clone());
            }
        }

        Self {
            parent_of,
            children_of,
        }
    }

    /// Nearest task ancestor, or None.
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent_of.get(id).and_then(|p| p.as_deref())
    }

    /// Direct task children.
    pub fn children(&self, id: &str) -> &[String] {
        self.children_of
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The task ancestor chain from the nearest upward. Bounded by a
    /// visited set, so even a corrupted parent graph terminates.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent.to_string());
            current = self.parent(parent);
        }
        chain
    }

    /// Breadth-first search of the task subtree for any descendant that is
    /// neither Done nor canceled.
    pub fn has_open_descendant(
        &self,
        id: &str,
        records: &HashMap<String, TaskRecord>,
    ) -> bool {
        let mut queue: VecDeque<&str> = self.children(id).iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(id);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(record) = records.get(current) {
                if !record.is_closed() {
                    return true;
                }
            }
            for child in self.children(current) {
                if !seen.contains(child.as_str()) {
                    queue.push_back(child);
                }
            }
        }
        false
    }
}

/// Walk a raw parent chain through container nodes until a known task id
/// turns up. Intermediate containers are memoized so sibling tasks under
/// the same container resolve without another store round-trip.
fn nearest_task_ancestor(
    task_id: &str,
    raw_parent: Option<&str>,
    records: &HashMap<String, TaskRecord>,
    source: &dyn NodeSource,
    aliases: &AliasMap,
    container_cache: &mut HashMap<String, Option<String>>,
) -> Option<String> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(task_id.to_string());

    let mut path: Vec<String> = Vec::new();
    let mut current = raw_parent.map(|p| aliases.resolve(p).to_string());

    let found = loop {
        let Some(id) = current else {
            break None;
        };
        if !visited.insert(id.clone()) {
            // Cyclic parent chain: treat as no ancestor.
            break None;
        }
        if records.contains_key(&id) {
            break Some(id);
        }
        if let Some(memoized) = container_cache.get(&id) {
            break memoized.clone();
        }
        path.push(id.clone());
        current = lookup(source, &id)
            .and_then(|node| node.parent)
            .map(|p| aliases.resolve(&p).to_string());
    };

    for container in path {
        container_cache.insert(container, found.clone());
    }
    found
}
