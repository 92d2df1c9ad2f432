//! Per-node metadata overlay
//!
//! A sparse mapping keyed exactly like the tree. A node may have no entry;
//! lookups are plain key lookups, with no traversal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::types::{CareerError, Result};

/// Rich facts about a node (exams, costs, colleges, tools)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub exams_to_give: Option<Vec<String>>,
    #[serde(default)]
    pub certifications: Option<Vec<String>>,
    #[serde(default)]
    pub qualifications_needed: Option<Vec<String>>,
    #[serde(default)]
    pub avg_cost_inr: Option<String>,
    #[serde(default)]
    pub top_colleges_or_companies: Option<Vec<String>>,
    #[serde(default)]
    pub tools_and_resources: Option<Vec<String>>,
    #[serde(default)]
    pub duration_years: Option<String>,
    #[serde(default)]
    pub real_life_applications: Option<Vec<String>>,
}

/// Metadata records by composite key
#[derive(Debug, Clone, Default)]
pub struct MetadataOverlay {
    records: HashMap<String, NodeMetadata>,
}

impl MetadataOverlay {
    pub fn new(records: HashMap<String, NodeMetadata>) -> Self {
        Self { records }
    }

    /// Parse a metadata document; `source` names it in error messages.
    pub fn from_json_str(json: &str, source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CareerError::Dataset(format!("{}: invalid JSON: {}", source, e)))?;
        let Value::Object(map) = value else {
            return Err(CareerError::Dataset(format!(
                "{}: expected a JSON object keyed by node path",
                source
            )));
        };

        let mut records = HashMap::with_capacity(map.len());
        for (key, raw) in map {
            let record: NodeMetadata = serde_json::from_value(raw).map_err(|e| {
                CareerError::Dataset(format!("{}: invalid metadata '{}': {}", source, key, e))
            })?;
            records.insert(key, record);
        }
        Ok(Self { records })
    }

    /// Load the overlay; a missing file is an empty overlay.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json_str(&json, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Metadata file not found, continuing without metadata");
                Ok(Self::default())
            }
            Err(e) => Err(CareerError::Dataset(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Metadata for a composite key, if any
    pub fn metadata_for_key(&self, key: &str) -> Option<&NodeMetadata> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
