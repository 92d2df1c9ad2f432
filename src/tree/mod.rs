//! Career tree store
//!
//! The bundled dataset is a JSON object keyed by composite path
//! (`"10th Class/Science/PCM"`). The composite key stays the external
//! identity of a node (metadata lookup, submissions, graph ids), but once
//! loaded the tree is an arena: every entry knows its parent by [`NodeId`]
//! and its children as an ordered list of [`ChildLink`]s. A child listed by
//! name with no entry of its own is a ghost (`target == None`), which is an
//! intentionally incomplete branch, not corruption.
//!
//! Traversal never rebuilds composite keys; the string concatenation happens
//! exactly once, while linking entries at load time.

pub mod handle;
pub mod metadata;
pub mod resolve;
pub mod slug;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::types::{CareerError, Result};

pub use handle::{Dataset, DatasetHandle, DatasetSource};
pub use metadata::{MetadataOverlay, NodeMetadata};
pub use resolve::{explore_href, resolve, Resolution};
pub use slug::slugify;

/// Separator between ancestor names in a composite key
pub const KEY_SEPARATOR: char = '/';

/// One career stage, stream, degree or destination as stored in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerNode {
    /// Display name
    pub node_title: String,

    /// True for a career destination (no further branching expected)
    #[serde(default)]
    pub is_terminal: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub avg_duration_years: Option<String>,

    /// Intended range 1-10; not enforced when reading
    #[serde(default)]
    pub difficulty_rating: i64,

    #[serde(default)]
    pub search_keywords: Vec<String>,

    /// Child names (not keys), in display order
    #[serde(default)]
    pub children: Vec<String>,
}

/// Index of an entry in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A child name as listed by its parent, linked to its entry when one exists
#[derive(Debug, Clone)]
pub struct ChildLink {
    pub name: String,
    /// `None` marks a ghost child
    pub target: Option<NodeId>,
}

impl ChildLink {
    pub fn is_ghost(&self) -> bool {
        self.target.is_none()
    }
}

/// A loaded node with its resolved relationships
#[derive(Debug, Clone)]
pub struct TreeEntry {
    id: NodeId,
    key: String,
    /// Byte offset of the own name within `key`
    name_start: usize,
    parent: Option<NodeId>,
    children: Vec<ChildLink>,
    record: CareerNode,
}

impl TreeEntry {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Composite key (`"A/B/C"`)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Own name: the key minus the parent key and separator.
    ///
    /// For an entry its parent lists by name this is exactly that listed
    /// name, even when the name itself contains the separator.
    pub fn name(&self) -> &str {
        &self.key[self.name_start..]
    }

    /// Parent entry, absent for roots and orphans
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[ChildLink] {
        &self.children
    }

    pub fn record(&self) -> &CareerNode {
        &self.record
    }

    pub fn is_root(&self) -> bool {
        !self.key.contains(KEY_SEPARATOR)
    }

    /// Number of separators in the key; roots are depth 0
    pub fn depth(&self) -> usize {
        self.key.matches(KEY_SEPARATOR).count()
    }

    /// Terminal, or nothing listed below it
    pub fn is_leaf(&self) -> bool {
        self.record.is_terminal || self.record.children.is_empty()
    }
}

/// Counts computed once at load time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub nodes: usize,
    pub roots: usize,
    pub terminals: usize,
    /// Child names with no entry of their own
    pub ghosts: usize,
    /// Non-root entries whose parent key has no entry
    pub orphans: usize,
}

/// Immutable, arena-backed career tree
#[derive(Debug, Clone, Default)]
pub struct CareerTree {
    entries: Vec<TreeEntry>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
    stats: DatasetStats,
}

impl CareerTree {
    /// Build the tree from `(composite key, record)` pairs.
    ///
    /// Pair order is preserved: it is the order roots are scanned in and the
    /// order nodes are emitted to the map. A repeated key replaces the
    /// earlier record but keeps the earlier position.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, CareerNode)>,
    {
        let mut entries: Vec<TreeEntry> = Vec::new();
        let mut index: HashMap<String, NodeId> = HashMap::new();

        for (key, record) in records {
            if let Some(&existing) = index.get(&key) {
                entries[existing.0].record = record;
                continue;
            }
            let id = NodeId(entries.len());
            index.insert(key.clone(), id);
            entries.push(TreeEntry {
                id,
                key,
                name_start: 0,
                parent: None,
                children: Vec::new(),
                record,
            });
        }

        // Parents come from the children lists first, so a name containing
        // the separator still links to the entry that lists it.
        for i in 0..entries.len() {
            let links: Vec<ChildLink> = entries[i]
                .record
                .children
                .iter()
                .map(|name| {
                    let child_key = format!("{}{}{}", entries[i].key, KEY_SEPARATOR, name);
                    ChildLink {
                        name: name.clone(),
                        target: index.get(&child_key).copied(),
                    }
                })
                .collect();

            let name_start = entries[i].key.len() + KEY_SEPARATOR.len_utf8();
            for target in links.iter().filter_map(|link| link.target) {
                let child = &mut entries[target.0];
                if child.parent.is_none() {
                    child.parent = Some(NodeId(i));
                    child.name_start = name_start;
                }
            }
            entries[i].children = links;
        }

        let mut stats = DatasetStats {
            nodes: entries.len(),
            ..DatasetStats::default()
        };
        let mut roots = Vec::new();

        for entry in entries.iter_mut() {
            // Unlisted entries fall back to the key prefix
            if entry.parent.is_none() {
                if let Some((parent_key, _)) = entry.key.rsplit_once(KEY_SEPARATOR) {
                    entry.parent = index.get(parent_key).copied();
                    entry.name_start = parent_key.len() + KEY_SEPARATOR.len_utf8();
                }
            }

            if entry.is_root() {
                roots.push(entry.id);
                stats.roots += 1;
            } else if entry.parent.is_none() {
                stats.orphans += 1;
            }
            if entry.record.is_terminal {
                stats.terminals += 1;
            }
            stats.ghosts += entry.children.iter().filter(|c| c.is_ghost()).count();
        }

        debug!(
            nodes = stats.nodes,
            roots = stats.roots,
            ghosts = stats.ghosts,
            orphans = stats.orphans,
            "Career tree linked"
        );

        Self {
            entries,
            index,
            roots,
            stats,
        }
    }

    /// Parse a dataset document; `source` names it in error messages.
    pub fn from_json_str(json: &str, source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CareerError::Dataset(format!("{}: invalid JSON: {}", source, e)))?;
        Self::from_value(value, source)
    }

    /// Build from an already-parsed dataset document
    pub fn from_value(value: Value, source: &str) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(CareerError::Dataset(format!(
                "{}: expected a JSON object keyed by node path",
                source
            )));
        };

        let mut records = Vec::with_capacity(map.len());
        for (key, raw) in map {
            let record: CareerNode = serde_json::from_value(raw).map_err(|e| {
                CareerError::Dataset(format!("{}: invalid node '{}': {}", source, key, e))
            })?;
            records.push((key, record));
        }

        Ok(Self::from_records(records))
    }

    /// Read and parse a dataset file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CareerError::Dataset(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    pub fn get(&self, id: NodeId) -> &TreeEntry {
        &self.entries[id.0]
    }

    pub fn lookup(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn entry(&self, key: &str) -> Option<&TreeEntry> {
        self.lookup(key).map(|id| self.get(id))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Root entries in dataset order
    pub fn roots(&self) -> impl Iterator<Item = &TreeEntry> {
        self.roots.iter().map(move |&id| self.get(id))
    }

    /// All entries in dataset order
    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        self.stats
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node(title: &str, children: &[&str]) -> CareerNode {
        CareerNode {
            node_title: title.to_string(),
            is_terminal: children.is_empty(),
            description: format!("About {}", title),
            avg_duration_years: None,
            difficulty_rating: 5,
            search_keywords: Vec::new(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// `10th` -> Science (mapped), Commerce (ghost)
    pub(crate) fn sample_tree() -> CareerTree {
        CareerTree::from_records(vec![
            ("10th".to_string(), node("10th", &["Science", "Commerce"])),
            ("10th/Science".to_string(), node("Science", &["PCM", "PCB"])),
            ("10th/Science/PCM".to_string(), node("PCM", &[])),
        ])
    }

    #[test]
    fn test_links_children_and_ghosts() {
        let tree = sample_tree();
        let root = tree.entry("10th").unwrap();
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].target, tree.lookup("10th/Science"));
        assert!(root.children()[1].is_ghost());

        let science = tree.entry("10th/Science").unwrap();
        assert_eq!(science.parent(), tree.lookup("10th"));
        assert_eq!(science.name(), "Science");
        assert_eq!(science.depth(), 1);
    }

    #[test]
    fn test_stats() {
        let stats = sample_tree().stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.roots, 1);
        assert_eq!(stats.terminals, 1);
        // Commerce under 10th, PCB under Science
        assert_eq!(stats.ghosts, 2);
        assert_eq!(stats.orphans, 0);
    }

    #[test]
    fn test_orphan_has_no_parent() {
        let tree = CareerTree::from_records(vec![
            ("Root".to_string(), node("Root", &[])),
            ("Missing/Child".to_string(), node("Child", &[])),
        ]);
        let orphan = tree.entry("Missing/Child").unwrap();
        assert!(orphan.parent().is_none());
        assert!(!orphan.is_root());
        assert_eq!(tree.stats().orphans, 1);
        assert_eq!(tree.roots().count(), 1);
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let tree = CareerTree::from_records(vec![
            ("A".to_string(), node("first", &[])),
            ("B".to_string(), node("B", &[])),
            ("A".to_string(), node("second", &[])),
        ]);
        assert_eq!(tree.len(), 2);
        let keys: Vec<_> = tree.entries().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(tree.entry("A").unwrap().record().node_title, "second");
    }

    #[test]
    fn test_from_json_preserves_order_and_defaults() {
        let json = r#"{
            "Zeta": {"node_title": "Zeta", "children": []},
            "Alpha": {"node_title": "Alpha", "is_terminal": true, "difficulty_rating": 9}
        }"#;
        let tree = CareerTree::from_json_str(json, "inline").unwrap();
        let roots: Vec<_> = tree.roots().map(|e| e.key()).collect();
        assert_eq!(roots, vec!["Zeta", "Alpha"]);
        let alpha = tree.entry("Alpha").unwrap().record();
        assert!(alpha.is_terminal);
        assert_eq!(alpha.difficulty_rating, 9);
        assert!(alpha.avg_duration_years.is_none());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = CareerTree::from_json_str("[1, 2]", "inline").unwrap_err();
        assert!(matches!(err, CareerError::Dataset(_)));
    }

    #[test]
    fn test_from_json_names_bad_node() {
        let err = CareerTree::from_json_str(r#"{"Broken": {"children": 3}}"#, "inline")
            .unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn test_name_containing_separator() {
        let tree = CareerTree::from_records(vec![
            ("12th".to_string(), node("12th", &["B.Tech / B.E."])),
            ("12th/B.Tech / B.E.".to_string(), node("B.Tech / B.E.", &["CSE"])),
            ("12th/B.Tech / B.E./CSE".to_string(), node("CSE", &[])),
        ]);
        let degree = tree.entry("12th/B.Tech / B.E.").unwrap();
        assert_eq!(degree.name(), "B.Tech / B.E.");
        assert_eq!(degree.parent(), tree.lookup("12th"));

        let cse = tree.entry("12th/B.Tech / B.E./CSE").unwrap();
        assert_eq!(cse.name(), "CSE");
        assert_eq!(cse.parent(), tree.lookup("12th/B.Tech / B.E."));
        assert_eq!(tree.stats().orphans, 0);
    }

    #[test]
    fn test_is_leaf() {
        let tree = sample_tree();
        assert!(tree.entry("10th/Science/PCM").unwrap().is_leaf());
        assert!(!tree.entry("10th").unwrap().is_leaf());
    }
}
