//! Shared types for career-tree

pub mod error;

pub use error::{CareerError, Result};
