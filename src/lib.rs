//! career-tree - career path explorer service
//!
//! Serves a static career tree (school stage, stream, degree, role) for
//! drill-down navigation and a laid-out map, and queues community edits and
//! new-path suggestions for review.
//!
//! ## Components
//!
//! - **tree**: dataset loading, slug codec, path resolution, metadata overlay
//! - **graph**: tree-to-graph flattening and hierarchical layout
//! - **submission**: rate limit, validation and persistence of submissions
//! - **routes** / **server**: the JSON HTTP API

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod routes;
pub mod server;
pub mod submission;
pub mod tree;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{CareerError, Result};
