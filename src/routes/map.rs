//! `GET /api/map` - the laid-out graph of the whole tree

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;

use super::cached_json_response;
use crate::graph::{GraphEdge, GraphNode};
use crate::tree::Dataset;

#[derive(Serialize)]
pub struct MapResponse<'a> {
    pub nodes: &'a [GraphNode],
    pub edges: &'a [GraphEdge],
    pub node_count: usize,
}

/// Serve the graph computed at load time
pub fn handle_map(dataset: &Dataset) -> Response<Full<Bytes>> {
    let graph = &dataset.graph;
    cached_json_response(&MapResponse {
        nodes: &graph.nodes,
        edges: &graph.edges,
        node_count: graph.node_count(),
    })
}
