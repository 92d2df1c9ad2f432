//! Submission gateway
//!
//! Community edits and new-path suggestions pass three checks in order:
//! the shared rate limit, schema validation, then the store. The first check
//! that fails ends the request; a rejected request never reaches the store.

pub mod rate_limit;
pub mod store;
pub mod validate;

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::types::CareerError;

pub use rate_limit::{RateLimit, TokenBucket};
pub use store::{
    EditRecord, MemorySubmissionStore, MongoSubmissionStore, QueueDepth, ReviewStatus,
    SubmissionStore, SuggestionRecord,
};
pub use validate::{
    validate_edit, validate_suggestion, EditRequest, ProposedNodeData, SuggestionRequest,
    ValidationErrors,
};

pub const EDIT_SAVED: &str = "Edit request saved to Database!";
pub const SUGGESTION_SAVED: &str = "Suggestion saved to Database!";

/// Why a submission was not accepted
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Too many requests. Slow down.")]
    RateLimited,

    #[error("Invalid input: {0}")]
    Invalid(ValidationErrors),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] CareerError),
}

impl SubmissionError {
    /// Message shown to the submitter
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::RateLimited => "Too many requests. Slow down.",
            Self::Invalid(_) => "Invalid input",
            Self::Persistence(_) => "Internal Server Error",
        }
    }
}

impl From<SubmissionError> for CareerError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::RateLimited => CareerError::RateLimited,
            SubmissionError::Invalid(errors) => CareerError::Validation(errors.to_string()),
            // Store details stay in the logs; the submitter sees a plain 500
            SubmissionError::Persistence(e) => CareerError::Internal(e.to_string()),
        }
    }
}

/// An accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub id: String,
    pub message: &'static str,
}

/// Rate limit, validate, persist
#[derive(Clone)]
pub struct SubmissionGateway {
    limiter: Arc<dyn RateLimit>,
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionGateway {
    pub fn new(limiter: Arc<dyn RateLimit>, store: Arc<dyn SubmissionStore>) -> Self {
        Self { limiter, store }
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    fn admit(&self, kind: &str) -> Result<(), SubmissionError> {
        if self.limiter.try_acquire() {
            Ok(())
        } else {
            warn!(kind, "Submission rate limited");
            Err(SubmissionError::RateLimited)
        }
    }

    /// Parse a body as JSON; unparseable input is a form-level validation error
    fn parse(body: &[u8]) -> Result<Value, SubmissionError> {
        serde_json::from_slice(body).map_err(|e| {
            let mut errors = ValidationErrors::default();
            errors.form(format!("Malformed JSON: {}", e));
            SubmissionError::Invalid(errors)
        })
    }

    /// Submit an edit proposal for an existing node
    pub async fn submit_edit(&self, body: &[u8]) -> Result<Accepted, SubmissionError> {
        self.admit("edit")?;

        let request = validate_edit(&Self::parse(body)?).map_err(SubmissionError::Invalid)?;
        let proposed_data = serde_json::to_value(&request.proposed)
            .map_err(|e| CareerError::Internal(format!("encoding proposed data: {}", e)))?;

        let record = EditRecord {
            target_node_key: request.node_key,
            original_data: Value::Object(request.original_data),
            proposed_data,
            status: ReviewStatus::PendingReview,
            timestamp: Utc::now(),
        };
        let key = record.target_node_key.clone();

        let id = self.store.create_edit(record).await.map_err(|e| {
            error!(error = %e, node_key = %key, "Failed to save edit");
            SubmissionError::Persistence(e)
        })?;

        info!(id = %id, node_key = %key, "Edit proposal queued for review");
        Ok(Accepted {
            id,
            message: EDIT_SAVED,
        })
    }

    /// Submit a new child suggestion under an existing node
    pub async fn submit_suggestion(&self, body: &[u8]) -> Result<Accepted, SubmissionError> {
        self.admit("suggestion")?;

        let request =
            validate_suggestion(&Self::parse(body)?).map_err(SubmissionError::Invalid)?;

        let record = SuggestionRecord {
            parent_path: request.parent_path,
            suggested_name: request.title,
            suggested_description: request.description,
            status: ReviewStatus::PendingReview,
            timestamp: Utc::now(),
        };
        let parent = record.parent_path.clone();

        let id = self.store.create_suggestion(record).await.map_err(|e| {
            error!(error = %e, parent_path = %parent, "Failed to save suggestion");
            SubmissionError::Persistence(e)
        })?;

        info!(id = %id, parent_path = %parent, "Suggestion queued for review");
        Ok(Accepted {
            id,
            message: SUGGESTION_SAVED,
        })
    }
}

impl std::fmt::Debug for SubmissionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionGateway")
            .field("store", &self.store.mode())
            .finish_non_exhaustive()
    }
}
