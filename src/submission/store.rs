//! Persistence collaborator for submissions
//!
//! The gateway only ever creates records. MongoDB backs production; the
//! memory store backs dev mode without a database, and tests.

use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::db::schemas::{EditDoc, SuggestionDoc, EDIT_COLLECTION, SUGGESTION_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::Result;

/// Moderation state of a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    PendingReview,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Edit proposal as persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditRecord {
    pub target_node_key: String,
    pub original_data: Value,
    pub proposed_data: Value,
    pub status: ReviewStatus,
    pub timestamp: DateTime<Utc>,
}

/// New-path suggestion as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionRecord {
    pub parent_path: String,
    pub suggested_name: String,
    pub suggested_description: String,
    pub status: ReviewStatus,
    pub timestamp: DateTime<Utc>,
}

/// Submissions still waiting for review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueDepth {
    pub edits: u64,
    pub suggestions: u64,
}

/// Where accepted submissions go
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist an edit proposal, returning its id
    async fn create_edit(&self, record: EditRecord) -> Result<String>;

    /// Persist a suggestion, returning its id
    async fn create_suggestion(&self, record: SuggestionRecord) -> Result<String>;

    /// Pending submissions by kind
    async fn queue_depth(&self) -> Result<QueueDepth>;

    /// Short label for logs and health output
    fn mode(&self) -> &'static str;
}

/// In-process store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    edits: RwLock<Vec<(String, EditRecord)>>,
    suggestions: RwLock<Vec<(String, SuggestionRecord)>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn edits(&self) -> Vec<(String, EditRecord)> {
        self.edits.read().await.clone()
    }

    pub async fn suggestions(&self) -> Vec<(String, SuggestionRecord)> {
        self.suggestions.read().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn create_edit(&self, record: EditRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.edits.write().await.push((id.clone(), record));
        Ok(id)
    }

    async fn create_suggestion(&self, record: SuggestionRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.suggestions.write().await.push((id.clone(), record));
        Ok(id)
    }

    async fn queue_depth(&self) -> Result<QueueDepth> {
        let pending = ReviewStatus::PendingReview;
        let edits = self
            .edits
            .read()
            .await
            .iter()
            .filter(|(_, r)| r.status == pending)
            .count();
        let suggestions = self
            .suggestions
            .read()
            .await
            .iter()
            .filter(|(_, r)| r.status == pending)
            .count();
        Ok(QueueDepth {
            edits: edits as u64,
            suggestions: suggestions as u64,
        })
    }

    fn mode(&self) -> &'static str {
        "memory"
    }
}

/// MongoDB-backed store writing the `edits` and `suggestions` collections
#[derive(Debug, Clone)]
pub struct MongoSubmissionStore {
    edits: MongoCollection<EditDoc>,
    suggestions: MongoCollection<SuggestionDoc>,
}

impl MongoSubmissionStore {
    /// Open both collections, creating their indexes
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            edits: client.collection(EDIT_COLLECTION).await?,
            suggestions: client.collection(SUGGESTION_COLLECTION).await?,
        })
    }
}

#[async_trait]
impl SubmissionStore for MongoSubmissionStore {
    async fn create_edit(&self, record: EditRecord) -> Result<String> {
        let doc = EditDoc::from_record(&record)?;
        let id = self.edits.insert_one(doc).await?;
        debug!(id = %id, collection = EDIT_COLLECTION, "Inserted edit");
        Ok(id.to_hex())
    }

    async fn create_suggestion(&self, record: SuggestionRecord) -> Result<String> {
        let id = self.suggestions.insert_one(SuggestionDoc::from(&record)).await?;
        debug!(id = %id, collection = SUGGESTION_COLLECTION, "Inserted suggestion");
        Ok(id.to_hex())
    }

    async fn queue_depth(&self) -> Result<QueueDepth> {
        let pending = ReviewStatus::PendingReview.as_str();
        Ok(QueueDepth {
            edits: self.edits.count(doc! { "status": pending }).await?,
            suggestions: self.suggestions.count(doc! { "status": pending }).await?,
        })
    }

    fn mode(&self) -> &'static str {
        "mongodb"
    }
}
