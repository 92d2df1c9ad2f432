//! Tree-to-graph flattening for the map view
//!
//! Every tree entry becomes one node; every child link that reaches an
//! entry becomes one edge. Ghost children produce no edge and no node, so
//! the map never shows unresolved branches. Positions come from a
//! [`LayoutEngine`]; this module only shapes the request and the response.

pub mod layout;

use serde::Serialize;

use crate::tree::{CareerTree, TreeEntry};

pub use layout::{
    LayeredLayout, LayoutEngine, LayoutNode, LayoutRequest, Point, RankDirection,
};

/// Node box size handed to the layout engine
pub const NODE_WIDTH: f64 = 170.0;
pub const NODE_HEIGHT: f64 = 50.0;

/// Edge colors by source depth; depths past the end reuse the last color
pub const EDGE_PALETTE: [&str; 5] = ["#111827", "#374151", "#6b7280", "#9ca3af", "#b1b1b7"];

/// Difficulty at or above which a non-terminal node is shown as demanding
pub const DEMANDING_DIFFICULTY: i64 = 8;

/// Edge color for a source node at `depth` (number of key separators)
pub fn edge_color(depth: usize) -> &'static str {
    EDGE_PALETTE[depth.min(EDGE_PALETTE.len() - 1)]
}

/// Visual class of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTone {
    /// Career destination
    Terminal,
    /// Study stage with a high difficulty rating
    Demanding,
    Standard,
}

impl NodeTone {
    pub fn for_entry(entry: &TreeEntry) -> Self {
        let record = entry.record();
        if record.is_terminal {
            Self::Terminal
        } else if record.difficulty_rating >= DEMANDING_DIFFICULTY {
            Self::Demanding
        } else {
            Self::Standard
        }
    }
}

/// Box colors for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub background: &'static str,
    pub border: &'static str,
}

impl NodeStyle {
    pub fn for_terminal(is_terminal: bool) -> Self {
        if is_terminal {
            Self {
                background: "#f0fdf4",
                border: "#22c55e",
            }
        } else {
            Self {
                background: "#ffffff",
                border: "#000000",
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    /// Composite key
    pub id: String,
    pub label: String,
    pub is_terminal: bool,
    pub tone: NodeTone,
    /// Top-left corner
    pub position: Point,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub color: &'static str,
}

/// Laid-out map of the whole tree
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Flatten the tree and lay it out left to right.
pub fn flatten(tree: &CareerTree, engine: &dyn LayoutEngine) -> GraphData {
    let mut edges = Vec::new();
    let mut layout_edges = Vec::new();

    for entry in tree.entries() {
        let color = edge_color(entry.depth());
        for target in entry.children().iter().filter_map(|c| c.target) {
            let child = tree.get(target);
            layout_edges.push((entry.id().index(), target.index()));
            edges.push(GraphEdge {
                id: format!("{}-{}", entry.key(), child.key()),
                source: entry.key().to_string(),
                target: child.key().to_string(),
                color,
            });
        }
    }

    let layout_nodes = vec![
        LayoutNode {
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
        };
        tree.len()
    ];
    let request = LayoutRequest::new(layout_nodes, layout_edges);
    let centers = engine.layout(&request);

    let nodes = tree
        .entries()
        .map(|entry| {
            let record = entry.record();
            let center = centers
                .get(entry.id().index())
                .copied()
                .unwrap_or_default();
            GraphNode {
                id: entry.key().to_string(),
                label: record.node_title.clone(),
                is_terminal: record.is_terminal,
                tone: NodeTone::for_entry(entry),
                position: Point {
                    x: center.x - NODE_WIDTH / 2.0,
                    y: center.y - NODE_HEIGHT / 2.0,
                },
                style: NodeStyle::for_terminal(record.is_terminal),
            }
        })
        .collect();

    GraphData { nodes, edges }
}
