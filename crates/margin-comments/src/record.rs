//! Comment record types, mirroring the backend's wire shape.

use chrono::{DateTime, Utc};
use margin_core::StoredAnchor;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identifier of a comment record, issued by the backend.
pub type CommentId = SmolStr;

/// Lifecycle status of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Active,
    Resolved,
    Archived,
}

impl CommentStatus {
    /// Allowed transitions: active -> resolved, active|resolved -> archived.
    /// Archived is terminal; same-status writes are a no-op upstream.
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Active, Self::Resolved)
                | (Self::Active, Self::Archived)
                | (Self::Resolved, Self::Archived)
        )
    }
}

/// What kind of content a comment body holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
}

/// The user who wrote a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: SmolStr,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A comment record as returned by the persistence layer.
///
/// Only top-level comments (no `parent_id`) carry anchor coordinates;
/// replies anchor conceptually to their parent. Anchor offsets are char
/// offsets into the article container's flattened text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: SmolStr,
    pub content: String,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<SmolStr>,
    pub status: CommentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: CommentAuthor,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// The stored anchor triple, for top-level comments that have one.
    ///
    /// Replies never anchor to text directly, so this is `None` for them
    /// even if stray coordinates are present on the record.
    pub fn anchor(&self) -> Option<StoredAnchor> {
        if self.is_reply() {
            return None;
        }
        let (start, end) = (self.selection_start?, self.selection_end?);
        Some(StoredAnchor {
            start,
            end,
            text: self.selected_text.clone(),
        })
    }
}
