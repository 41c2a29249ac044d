//! The collaborator boundary to the host outline store.
//!
//! The core never owns task data. It consumes [`TaskNode`]s through the
//! [`NodeSource`] trait: a batch query by tag, a single-node lookup that may
//! fail transiently, and an optional in-memory index that is preferred over
//! the lookup within one resolution pass. [`SnapshotStore`] is the concrete
//! source used by the CLI, backed by a JSON export of the store.

pub mod reader;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::Result;
use crate::config::FieldSchema;

/// A raw node as the host store exposes it.
///
/// Status, time, dependency, review, and recurrence fields all live in the
/// free-form property bag and are extracted by the schema-aware
/// [`reader`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    /// Stable node id.
    pub id: String,

    /// Node text content; doubles as the task title.
    #[serde(default)]
    pub text: String,

    /// Parent node id, task or container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Child node ids, in store order.
    #[serde(default)]
    pub children: Vec<String>,

    /// Tags carried by the node.
    #[serde(default)]
    pub tags: Vec<String>,

    /// When set, this node is a mirrored view of another node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_of: Option<String>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Free-form property bag.
    #[serde(default)]
    pub props: HashMap<String, Value>,
}

impl TaskNode {
    /// Create a bare node with an id and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            parent: None,
            children: Vec::new(),
            tags: Vec::new(),
            mirror_of: None,
            created_at: None,
            updated_at: None,
            props: HashMap::new(),
        }
    }

    /// Returns true when the node carries the task marker tag.
    pub fn is_task(&self, schema: &FieldSchema) -> bool {
        self.tags.iter().any(|t| t == &schema.task_tag)
    }

    /// Fetch a property by key.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }
}

/// Access to the host store.
///
/// `node` may suspend and may fail transiently; `cached` consults the live
/// in-memory index and is always preferred within a pass to avoid redundant
/// round-trips.
pub trait NodeSource {
    /// Single-node lookup.
    fn node(&self, id: &str) -> Result<Option<TaskNode>>;

    /// Batch fetch of all nodes carrying the given tag.
    fn tagged(&self, tag: &str) -> Result<Vec<TaskNode>>;

    /// Already-loaded node, if the store keeps a live index.
    fn cached(&self, _id: &str) -> Option<TaskNode> {
        None
    }

    /// Resolve a reference that may be a relation id rather than a node id.
    fn resolve_ref(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Look a node up through the cheap path first; a failing lookup is logged
/// and reported as absent so one bad node never aborts a whole pass.
pub fn lookup(source: &dyn NodeSource, id: &str) -> Option<TaskNode> {
    if let Some(node) = source.cached(id) {
        return Some(node);
    }
    match source.node(id) {
        Ok(node) => node,
        Err(err) => {
            tracing::warn!(id, error = %err, "store lookup failed; treating node as absent");
            None
        }
    }
}

/// Alias → canonical-id map for mirror indirection.
///
/// Built once per resolution pass; every external reference goes through
/// [`AliasMap::resolve`] before any graph or hierarchy operation, so the
/// algorithms never see two ids for the same task.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    canonical: HashMap<String, String>,
}

impl AliasMap {
    /// Build the map from every node carrying a mirror pointer, following
    /// chains of mirrors with a visited-set guard.
    pub fn build(nodes: &[TaskNode]) -> Self {
        let direct: HashMap<&str, &str> = nodes
            .iter()
            .filter_map(|n| n.mirror_of.as_deref().map(|target| (n.id.as_str(), target)))
            .collect();

        let mut canonical = HashMap::new();
        for (&alias, &first) in &direct {
            let mut target = first;
            let mut seen: HashSet<&str> = HashSet::new();
            seen.insert(alias);
            while let Some(&next) = direct.get(target) {
                if !seen.insert(target) {
                    break;
                }
                target = next;
            }
            canonical.insert(alias.to_string(), target.to_string());
        }
        Self { canonical }
    }

    /// Canonical id for the given id; identity when it is not an alias.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.canonical.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Number of aliases in the map.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// Returns true when no node mirrors another.
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// On-disk snapshot format: the node list plus an optional relation table
/// mapping relation ids to node ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<TaskNode>,

    #[serde(default)]
    pub refs: HashMap<String, String>,
}

/// In-memory store over a snapshot, the `NodeSource` used by the CLI.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    by_id: HashMap<String, TaskNode>,
    order: Vec<String>,
    refs: HashMap<String, String>,
}

impl SnapshotStore {
    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Build a store from an already-parsed snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let order = snapshot.nodes.iter().map(|n| n.id.clone()).collect();
        let by_id = snapshot
            .nodes
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        Self {
            by_id,
            order,
            refs: snapshot.refs,
        }
    }

    /// All nodes in snapshot order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true for an empty snapshot.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl NodeSource for SnapshotStore {
    fn node(&self, id: &str) -> Result<Option<TaskNode>> {
        Ok(self.by_id.get(id).cloned())
    }

    fn tagged(&self, tag: &str) -> Result<Vec<TaskNode>> {
        Ok(self
            .nodes()
            .filter(|n| n.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    fn cached(&self, id: &str) -> Option<TaskNode> {
        self.by_id.get(id).cloned()
    }

    fn resolve_ref(&self, raw: &str) -> String {
        self.refs.get(raw).cloned().unwrap_or_else(|| raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_map_resolves_mirror() {
        let mut mirror = TaskNode::new("mirror-1", "");
        mirror.mirror_of = Some("real-1".to_string());
        let real = TaskNode::new("real-1", "the task");
        let aliases = AliasMap::build(&[mirror, real]);
        assert_eq!(aliases.resolve("mirror-1"), "real-1");
        assert_eq!(aliases.resolve("real-1"), "real-1");
        assert_eq!(aliases.resolve("unknown"), "unknown");
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_alias_map_follows_chains() {
        let mut a = TaskNode::new("a", "");
        a.mirror_of = Some("b".to_string());
        let mut b = TaskNode::new("b", "");
        b.mirror_of = Some("c".to_string());
        let c = TaskNode::new("c", "");
        let aliases = AliasMap::build(&[a, b, c]);
        assert_eq!(aliases.resolve("a"), "c");
        assert_eq!(aliases.resolve("b"), "c");
    }

    #[test]
    fn test_alias_map_survives_mirror_cycle() {
        let mut a = TaskNode::new("a", "");
        a.mirror_of = Some("b".to_string());
        let mut b = TaskNode::new("b", "");
        b.mirror_of = Some("a".to_string());
        let aliases = AliasMap::build(&[a, b]);
        // A cyclic mirror chain terminates instead of hanging; each side
        // resolves to the other end of the chain.
        assert_eq!(aliases.resolve("a"), "b");
        assert_eq!(aliases.resolve("b"), "a");
    }

    #[test]
    fn test_snapshot_store_roundtrip() {
        let json = r#"{
            "nodes": [
                {"id": "n1", "text": "Task one", "tags": ["task"],
                 "props": {"status": "todo"}},
                {"id": "n2", "text": "A container", "children": ["n1"]}
            ],
            "refs": {"rel-9": "n1"}
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let store = SnapshotStore::from_snapshot(snapshot);
        assert_eq!(store.len(), 2);
        assert!(store.node("n1").unwrap().is_some());
        assert!(store.node("ghost").unwrap().is_none());
        assert_eq!(store.tagged("task").unwrap().len(), 1);
        assert_eq!(store.resolve_ref("rel-9"), "n1");
        assert_eq!(store.resolve_ref("n2"), "n2");
    }

    #[test]
    fn test_is_task_uses_schema_tag() {
        let schema = FieldSchema::default();
        let mut node = TaskNode::new("n1", "t");
        assert!(!node.is_task(&schema));
        node.tags.push("task".to_string());
        assert!(node.is_task(&schema));
    }

    struct FailingSource;

    impl NodeSource for FailingSource {
        fn node(&self, _id: &str) -> Result<Option<TaskNode>> {
            Err(crate::Error::Other("backend unavailable".to_string()))
        }

        fn tagged(&self, _tag: &str) -> Result<Vec<TaskNode>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_lookup_swallows_transient_failures() {
        assert!(lookup(&FailingSource, "n1").is_none());
    }
}
