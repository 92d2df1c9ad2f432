//! Edit proposal document schema

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::submission::{EditRecord, ReviewStatus};
use crate::types::Result;

/// Collection name for edit proposals
pub const EDIT_COLLECTION: &str = "edits";

/// Proposed change to an existing node
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EditDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Composite key of the node being edited
    pub target_node_key: String,

    /// Node content as the visitor saw it
    pub original_data: Document,

    /// Normalized replacement content
    pub proposed_data: Document,

    #[serde(default)]
    pub status: ReviewStatus,

    pub timestamp: DateTime,
}

impl EditDoc {
    pub fn from_record(record: &EditRecord) -> Result<Self> {
        Ok(Self {
            _id: None,
            metadata: Metadata::new(),
            target_node_key: record.target_node_key.clone(),
            original_data: bson::to_document(&record.original_data)?,
            proposed_data: bson::to_document(&record.proposed_data)?,
            status: record.status,
            timestamp: DateTime::from_chrono(record.timestamp),
        })
    }
}

impl IntoIndexes for EditDoc {
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
                doc! { "target_node_key": 1 },
                Some(
                    IndexOptions::builder()
                        .name("target_node_key_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for EditDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
