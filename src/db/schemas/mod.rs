//! Document schemas for the moderation queue
//!
//! Edit proposals and path suggestions land here with status
//! `pending_review`. Reviewing them happens outside this service.

mod edit;
mod metadata;
mod suggestion;

pub use edit::{EditDoc, EDIT_COLLECTION};
pub use metadata::Metadata;
pub use suggestion::{SuggestionDoc, SUGGESTION_COLLECTION};
