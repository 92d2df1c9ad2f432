//! Navigation routes
//!
//! - `GET /api/roots` - entry points for the home page
//! - `GET /api/explore/{slug}/...` - resolve a slug path
//! - `GET /api/metadata?key=...` - metadata for a composite key

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::{career_error_response, cached_json_response, json_response, parse_query_params};
use crate::tree::{
    explore_href, slugify, CareerNode, CareerTree, Dataset, NodeMetadata, Resolution, TreeEntry,
};
use crate::types::CareerError;

pub const EXPLORE_PREFIX: &str = "/api/explore";

#[derive(Serialize)]
pub struct RootLink<'a> {
    pub key: &'a str,
    pub title: &'a str,
    pub slug: String,
    pub href: String,
}

#[derive(Serialize)]
pub struct NodeView<'a> {
    pub key: &'a str,
    #[serde(flatten)]
    pub record: &'a CareerNode,
}

#[derive(Serialize)]
pub struct ParentLink<'a> {
    pub key: &'a str,
    pub title: &'a str,
    pub href: String,
}

#[derive(Serialize)]
pub struct ChildView<'a> {
    pub name: &'a str,
    pub slug: String,
    pub href: String,
    /// False for a listed child with no entry yet
    pub mapped: bool,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExploreResponse<'a> {
    Found {
        node: NodeView<'a>,
        slugs: &'a [String],
        href: String,
        parent: Option<ParentLink<'a>>,
        parent_href: String,
        children: Vec<ChildView<'a>>,
        is_leaf: bool,
        metadata: Option<&'a NodeMetadata>,
    },
    Pending {
        name: &'a str,
        parent: ParentLink<'a>,
    },
    NotFound {
        slugs: Vec<String>,
    },
}

fn parent_link<'a>(tree: &CareerTree, entry: &'a TreeEntry) -> ParentLink<'a> {
    ParentLink {
        key: entry.key(),
        title: &entry.record().node_title,
        href: explore_href(tree.slug_path(entry).as_slice()),
    }
}

/// Slug segments after `/api/explore`, percent-decoded, empty ones dropped
pub fn parse_slugs(path: &str) -> Vec<String> {
    let rest = path.strip_prefix(EXPLORE_PREFIX).unwrap_or(path);
    rest.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect()
}

/// GET /api/roots
pub fn handle_roots(dataset: &Dataset) -> Response<Full<Bytes>> {
    let roots: Vec<RootLink> = dataset
        .tree
        .roots()
        .map(|root| {
            let slug = slugify(root.name());
            RootLink {
                key: root.key(),
                title: &root.record().node_title,
                href: explore_href(&[slug.as_str()]),
                slug,
            }
        })
        .collect();
    cached_json_response(&roots)
}

/// GET /api/explore/{slug}/...
pub fn handle_explore(dataset: &Dataset, path: &str) -> Response<Full<Bytes>> {
    let slugs = parse_slugs(path);
    let resolution = dataset.tree.resolve(slugs.as_slice());
    debug!(path = %path, outcome = resolution.kind(), "Resolved explore path");

    match resolution {
        Resolution::Found {
            node,
            parent,
            slugs,
        } => {
            let children = node
                .children()
                .iter()
                .map(|child| {
                    let slug = slugify(&child.name);
                    let mut child_slugs = slugs.clone();
                    child_slugs.push(slug.clone());
                    ChildView {
                        name: &child.name,
                        href: explore_href(&child_slugs),
                        slug,
                        mapped: !child.is_ghost(),
                    }
                })
                .collect();

            let body = ExploreResponse::Found {
                node: NodeView {
                    key: node.key(),
                    record: node.record(),
                },
                slugs: &slugs,
                href: explore_href(&slugs),
                parent: parent.map(|p| parent_link(&dataset.tree, p)),
                parent_href: explore_href(&slugs[..slugs.len().saturating_sub(1)]),
                children,
                is_leaf: node.is_leaf(),
                metadata: dataset.metadata.metadata_for_key(node.key()),
            };
            json_response(StatusCode::OK, &body)
        }
        Resolution::Pending { name, parent } => json_response(
            StatusCode::OK,
            &ExploreResponse::Pending {
                name,
                parent: parent_link(&dataset.tree, parent),
            },
        ),
        Resolution::NotFound => json_response(
            StatusCode::NOT_FOUND,
            &ExploreResponse::NotFound { slugs },
        ),
    }
}

/// GET /api/metadata?key=...
pub fn handle_metadata(dataset: &Dataset, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));
    let Some(key) = params.get("key").filter(|k| !k.is_empty()) else {
        return career_error_response(CareerError::BadRequest("missing 'key' parameter".into()));
    };

    match dataset.metadata.metadata_for_key(key) {
        Some(metadata) => cached_json_response(metadata),
        None => {
            career_error_response(CareerError::NotFound(format!("no metadata for '{}'", key)))
        }
    }
}
