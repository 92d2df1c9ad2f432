//! Hierarchical layout
//!
//! The map view hands the whole node/edge set to a [`LayoutEngine`] and only
//! owns the request/response shape. [`LayeredLayout`] is the built-in
//! engine: longest-path ranking over a petgraph `DiGraph`, ranks laid out
//! along the configured direction, nodes within a rank ordered by
//! depth-first discovery from the sources so siblings stay together.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Dfs};
use petgraph::Direction;
use serde::Serialize;
use tracing::warn;

/// Direction ranks advance in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDirection {
    #[default]
    LeftToRight,
    TopToBottom,
}

/// Node box to place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    pub width: f64,
    pub height: f64,
}

/// Full layout input: nodes by index, edges as `(source, target)` indices
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<(usize, usize)>,
    pub direction: RankDirection,
    /// Gap between adjacent ranks
    pub rank_sep: f64,
    /// Gap between adjacent nodes in one rank
    pub node_sep: f64,
}

impl LayoutRequest {
    pub fn new(nodes: Vec<LayoutNode>, edges: Vec<(usize, usize)>) -> Self {
        Self {
            nodes,
            edges,
            direction: RankDirection::LeftToRight,
            rank_sep: 50.0,
            node_sep: 50.0,
        }
    }
}

/// A position in layout space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Computes node centers for a directed graph
pub trait LayoutEngine: Send + Sync {
    /// One center per request node, in request order
    fn layout(&self, request: &LayoutRequest) -> Vec<Point>;
}

/// Layered layout built on petgraph
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredLayout;

impl LayeredLayout {
    fn build_graph(request: &LayoutRequest) -> (DiGraph<(), ()>, Vec<NodeIndex>) {
        let mut graph = DiGraph::with_capacity(request.nodes.len(), request.edges.len());
        let indices: Vec<NodeIndex> = request.nodes.iter().map(|_| graph.add_node(())).collect();
        for &(source, target) in &request.edges {
            if source < indices.len() && target < indices.len() {
                graph.add_edge(indices[source], indices[target], ());
            }
        }
        (graph, indices)
    }

    /// Longest path from any source; BFS layering if the graph has a cycle
    fn ranks(graph: &DiGraph<(), ()>) -> Vec<usize> {
        let mut rank = vec![0usize; graph.node_count()];

        match toposort(graph, None) {
            Ok(order) => {
                for node in order {
                    let r = rank[node.index()];
                    for next in graph.neighbors_directed(node, Direction::Outgoing) {
                        rank[next.index()] = rank[next.index()].max(r + 1);
                    }
                }
            }
            Err(cycle) => {
                warn!(node = cycle.node_id().index(), "Layout input has a cycle, using BFS layering");
                let mut seen = vec![false; graph.node_count()];
                for start in Self::sources_first(graph) {
                    if seen[start.index()] {
                        continue;
                    }
                    seen[start.index()] = true;
                    let mut bfs = Bfs::new(graph, start);
                    while let Some(node) = bfs.next(graph) {
                        for next in graph.neighbors_directed(node, Direction::Outgoing) {
                            if !seen[next.index()] {
                                seen[next.index()] = true;
                                rank[next.index()] = rank[node.index()] + 1;
                            }
                        }
                    }
                }
            }
        }

        rank
    }

    /// Sources in index order, then every other node in index order
    fn sources_first(graph: &DiGraph<(), ()>) -> Vec<NodeIndex> {
        let (mut sources, others): (Vec<NodeIndex>, Vec<NodeIndex>) = graph
            .node_indices()
            .partition(|&n| graph.neighbors_directed(n, Direction::Incoming).next().is_none());
        sources.extend(others);
        sources
    }

    /// Depth-first discovery order from the sources
    fn discovery_order(graph: &DiGraph<(), ()>) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(graph.node_count());
        let mut seen = vec![false; graph.node_count()];
        let mut dfs = Dfs::empty(graph);

        for start in Self::sources_first(graph) {
            if seen[start.index()] {
                continue;
            }
            dfs.move_to(start);
            while let Some(node) = dfs.next(graph) {
                if !seen[node.index()] {
                    seen[node.index()] = true;
                    order.push(node);
                }
            }
        }
        order
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, request: &LayoutRequest) -> Vec<Point> {
        if request.nodes.is_empty() {
            return Vec::new();
        }

        let (graph, indices) = Self::build_graph(request);
        let ranks = Self::ranks(&graph);
        let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;

        // Extent of a node along the rank axis and across it
        let (along, across): (Vec<f64>, Vec<f64>) = request
            .nodes
            .iter()
            .map(|n| match request.direction {
                RankDirection::LeftToRight => (n.width, n.height),
                RankDirection::TopToBottom => (n.height, n.width),
            })
            .unzip();

        let mut rank_thickness = vec![0.0f64; rank_count];
        for (i, &r) in ranks.iter().enumerate() {
            rank_thickness[r] = rank_thickness[r].max(along[i]);
        }
        let mut rank_offset = vec![0.0f64; rank_count];
        for r in 1..rank_count {
            rank_offset[r] = rank_offset[r - 1] + rank_thickness[r - 1] + request.rank_sep;
        }

        // Cross-axis placement in discovery order, then center each rank
        let mut cursor = vec![0.0f64; rank_count];
        let mut cross = vec![0.0f64; request.nodes.len()];
        for node in Self::discovery_order(&graph) {
            let i = node.index();
            let r = ranks[i];
            cross[i] = cursor[r] + across[i] / 2.0;
            cursor[r] += across[i] + request.node_sep;
        }
        let extents: Vec<f64> = cursor
            .iter()
            .map(|&c| (c - request.node_sep).max(0.0))
            .collect();
        let widest = extents.iter().copied().fold(0.0f64, f64::max);

        indices
            .iter()
            .map(|node| {
                let i = node.index();
                let r = ranks[i];
                let main = rank_offset[r] + rank_thickness[r] / 2.0;
                let side = cross[i] + (widest - extents[r]) / 2.0;
                match request.direction {
                    RankDirection::LeftToRight => Point { x: main, y: side },
                    RankDirection::TopToBottom => Point { x: side, y: main },
                }
            })
            .collect()
    }
}
