//! The persistence contract for comment records.
//!
//! The real backend lives outside this workspace; the engine only needs
//! this trait. Mutations that fail return `Err` and commit nothing - the
//! caller keeps showing the last known persisted state, never a phantom
//! updated one.

use thiserror::Error;
use tokio::sync::watch;

use crate::record::{Comment, CommentAuthor, CommentId, CommentStatus, ContentType};
use smol_str::SmolStr;

/// Errors from the persistence layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// No record with the given id.
    #[error("comment not found: {0}")]
    NotFound(CommentId),

    /// The requested status change is not a legal lifecycle transition.
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: CommentStatus,
        to: CommentStatus,
    },

    /// The backend refused the mutation.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Fields for creating a comment.
#[derive(Clone, Debug)]
pub struct NewComment {
    pub article_id: SmolStr,
    pub content: String,
    pub content_type: ContentType,
    pub image_url: Option<String>,
    /// Anchor triple; only meaningful (and only legal) without `parent_id`.
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
    pub selected_text: Option<SmolStr>,
    pub parent_id: Option<CommentId>,
    pub user: CommentAuthor,
}

impl NewComment {
    /// A plain text comment anchored to a selection.
    pub fn anchored(
        article_id: impl Into<SmolStr>,
        content: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<SmolStr>,
        user: CommentAuthor,
    ) -> Self {
        Self {
            article_id: article_id.into(),
            content: content.into(),
            content_type: ContentType::Text,
            image_url: None,
            selection_start: Some(start),
            selection_end: Some(end),
            selected_text: Some(text.into()),
            parent_id: None,
            user,
        }
    }

    /// A reply to an existing comment.
    pub fn reply(
        article_id: impl Into<SmolStr>,
        parent_id: impl Into<CommentId>,
        content: impl Into<String>,
        user: CommentAuthor,
    ) -> Self {
        Self {
            article_id: article_id.into(),
            content: content.into(),
            content_type: ContentType::Text,
            image_url: None,
            selection_start: None,
            selection_end: None,
            selected_text: None,
            parent_id: Some(parent_id.into()),
            user,
        }
    }
}

/// Content edits to an existing comment.
#[derive(Clone, Debug, Default)]
pub struct CommentPatch {
    pub content: Option<String>,
}

/// Async persistence contract.
///
/// `subscribe` is the realtime refresh trigger: the receiver's value is
/// bumped on every insert/update/delete, and the consumer reacts by
/// re-issuing `list` - there is no diffing protocol beyond that.
pub trait CommentStore {
    /// The threaded comment set for one article (top-level comments with
    /// replies nested in creation order).
    async fn list(&self, article_id: &str) -> Result<Vec<Comment>, StoreError>;

    async fn create(&self, new: NewComment) -> Result<Comment, StoreError>;

    async fn update(&self, id: &str, patch: CommentPatch) -> Result<Comment, StoreError>;

    async fn update_status(&self, id: &str, status: CommentStatus) -> Result<(), StoreError>;

    /// Delete a comment; deleting a top-level comment takes its replies
    /// with it.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Change notifications: bumped generation on any mutation.
    fn subscribe(&self) -> watch::Receiver<u64>;
}
