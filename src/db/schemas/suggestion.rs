//! Path suggestion document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::submission::{ReviewStatus, SuggestionRecord};

/// Collection name for new-path suggestions
pub const SUGGESTION_COLLECTION: &str = "suggestions";

/// A proposed new child under an existing node
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SuggestionDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Composite key of the node the suggestion goes under
    pub parent_path: String,

    pub suggested_name: String,

    pub suggested_description: String,

    #[serde(default)]
    pub status: ReviewStatus,

    pub timestamp: DateTime,
}

impl From<&SuggestionRecord> for SuggestionDoc {
    fn from(record: &SuggestionRecord) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            parent_path: record.parent_path.clone(),
            suggested_name: record.suggested_name.clone(),
            suggested_description: record.suggested_description.clone(),
            status: record.status,
            timestamp: DateTime::from_chrono(record.timestamp),
        }
    }
}

impl IntoIndexes for SuggestionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("status_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "parent_path": 1 },
                Some(
                    IndexOptions::builder()
                        .name("parent_path_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SuggestionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
