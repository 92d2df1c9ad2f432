//! Bundled and fixture datasets through the public API

use std::path::PathBuf;
use std::sync::Arc;

use career_tree::graph::{self, LayeredLayout};
use career_tree::tree::{CareerTree, DatasetHandle, DatasetSource, MetadataOverlay, Resolution};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn bundled_tree() -> CareerTree {
    CareerTree::load(&data_path("career_tree_data.json")).expect("bundled dataset loads")
}

#[test]
fn test_bundled_dataset_is_consistent() {
    let tree = bundled_tree();
    let stats = tree.stats();
    assert!(stats.nodes > 0);
    assert_eq!(stats.roots, 1);
    assert_eq!(stats.orphans, 0);
    assert!(stats.ghosts > 0, "bundled data keeps some branches unmapped");

    let metadata = MetadataOverlay::load(&data_path("metadata.json")).unwrap();
    assert!(!metadata.is_empty());
    for entry in tree.entries() {
        assert!(!entry.record().node_title.is_empty(), "{} has no title", entry.key());
    }
}

#[test]
fn test_every_bundled_node_is_reachable_by_url() {
    let tree = bundled_tree();
    for entry in tree.entries() {
        let slugs = tree.slug_path(entry);
        match tree.resolve(slugs.as_slice()) {
            Resolution::Found { node, .. } => assert_eq!(node.key(), entry.key()),
            other => panic!("{} resolved to {}", entry.key(), other.kind()),
        }
    }
}

#[test]
fn test_bundled_ghosts_resolve_pending() {
    let tree = bundled_tree();
    let mut checked = 0;
    for entry in tree.entries() {
        for child in entry.children().iter().filter(|c| c.is_ghost()) {
            let mut slugs = tree.slug_path(entry);
            slugs.push(career_tree::tree::slugify(&child.name));
            match tree.resolve(slugs.as_slice()) {
                Resolution::Pending { name, parent } => {
                    assert_eq!(name, child.name);
                    assert_eq!(parent.key(), entry.key());
                }
                other => panic!("ghost {} resolved to {}", child.name, other.kind()),
            }
            checked += 1;
        }
    }
    assert_eq!(checked, tree.stats().ghosts);
}

#[test]
fn test_bundled_navigation_examples() {
    let tree = bundled_tree();

    match tree.resolve(&["10th-class", "science", "pcm", "b-tech"]) {
        Resolution::Found { node, parent, .. } => {
            assert_eq!(node.key(), "10th Class/Science/PCM/B.Tech");
            assert_eq!(parent.map(|p| p.key()), Some("10th Class/Science/PCM"));
        }
        other => panic!("expected found, got {}", other.kind()),
    }

    match tree.resolve(&["10th-class", "commerce", "bba"]) {
        Resolution::Pending { name, parent } => {
            assert_eq!(name, "BBA");
            assert_eq!(parent.key(), "10th Class/Commerce");
        }
        other => panic!("expected pending, got {}", other.kind()),
    }

    assert!(tree.resolve(&["12th-class"]).is_not_found());
    assert!(tree.resolve(&["10th-class", "sports", "science"]).is_not_found());
}

#[test]
fn test_bundled_metadata_keys_exist_in_tree() {
    let tree = bundled_tree();
    let raw = std::fs::read_to_string(data_path("metadata.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in value.as_object().unwrap().keys() {
        assert!(tree.contains_key(key), "metadata for unknown node {}", key);
    }
}

#[test]
fn test_bundled_map_has_no_dangling_edges() {
    let tree = bundled_tree();
    let map = graph::flatten(&tree, &LayeredLayout);

    assert_eq!(map.node_count(), tree.len());
    assert_eq!(map.edges.len(), tree.len() - tree.stats().roots);
    for edge in &map.edges {
        assert!(tree.contains_key(&edge.source));
        assert!(tree.contains_key(&edge.target), "edge {} has no target", edge.id);
    }

    // Ranks advance left to right
    let position = |key: &str| {
        map.nodes
            .iter()
            .find(|n| n.id == key)
            .map(|n| n.position)
            .unwrap()
    };
    assert!(position("10th Class").x < position("10th Class/Science").x);
    assert!(position("10th Class/Science").x < position("10th Class/Science/PCM").x);
}

#[test]
fn test_handle_reload_from_fixture_dir() {
    let dir = tempfile::tempdir().unwrap();
    let tree_path = dir.path().join("tree.json");
    let metadata_path = dir.path().join("metadata.json");
    std::fs::write(
        &tree_path,
        r#"{"Root": {"node_title": "Root", "children": ["Leaf"]}}"#,
    )
    .unwrap();
    std::fs::write(&metadata_path, r#"{"Root": {"duration_years": "2"}}"#).unwrap();

    let handle = DatasetHandle::open(
        DatasetSource::new(&tree_path, &metadata_path),
        Arc::new(LayeredLayout),
    )
    .unwrap();
    assert!(handle.snapshot().tree.resolve(&["root", "leaf"]).is_pending());

    std::fs::write(
        &tree_path,
        r#"{
            "Root": {"node_title": "Root", "children": ["Leaf"]},
            "Root/Leaf": {"node_title": "Leaf", "is_terminal": true}
        }"#,
    )
    .unwrap();
    let stats = handle.reload().unwrap();
    assert_eq!(stats.ghosts, 0);

    let snapshot = handle.snapshot();
    assert!(snapshot.tree.resolve(&["root", "leaf"]).is_found());
    assert_eq!(
        snapshot
            .metadata
            .metadata_for_key("Root")
            .and_then(|m| m.duration_years.as_deref()),
        Some("2")
    );
}
