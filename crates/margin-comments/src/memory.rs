//! In-memory reference implementation of the persistence contract.
//!
//! Used by tests and local development. Behaves like the real backend is
//! expected to: id assignment, timestamping, transition validation,
//! cascade delete, and a change notification on every mutation.

use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::watch;

use crate::record::{Comment, CommentStatus};
use crate::store::{CommentPatch, CommentStore, NewComment, StoreError};
use crate::thread::CommentThreads;

#[derive(Default)]
struct Inner {
    next_id: u64,
    /// Flat record list; nesting happens on `list`.
    records: Vec<Comment>,
}

/// In-memory comment store with watch-based change notifications.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    tx: watch::Sender<u64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner::default()),
            tx,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store poisoned")
    }
}

impl CommentStore for MemoryStore {
    async fn list(&self, article_id: &str) -> Result<Vec<Comment>, StoreError> {
        let inner = self.lock();
        let records: Vec<Comment> = inner
            .records
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        Ok(CommentThreads::from_flat(records).into_roots())
    }

    async fn create(&self, new: NewComment) -> Result<Comment, StoreError> {
        if new.parent_id.is_some()
            && (new.selection_start.is_some()
                || new.selection_end.is_some()
                || new.selected_text.is_some())
        {
            return Err(StoreError::Rejected(
                "replies cannot carry selection anchors".into(),
            ));
        }

        let mut inner = self.lock();
        if let Some(parent_id) = &new.parent_id {
            let parent = inner
                .records
                .iter()
                .find(|c| &c.id == parent_id)
                .ok_or_else(|| StoreError::NotFound(parent_id.clone()))?;
            if parent.parent_id.is_some() {
                return Err(StoreError::Rejected(
                    "replies to replies are not supported".into(),
                ));
            }
        }

        inner.next_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: format!("c{}", inner.next_id).into(),
            article_id: new.article_id,
            content: new.content,
            content_type: new.content_type,
            image_url: new.image_url,
            selection_start: new.selection_start,
            selection_end: new.selection_end,
            selected_text: new.selected_text,
            status: CommentStatus::Active,
            parent_id: new.parent_id,
            replies: vec![],
            created_at: now,
            updated_at: now,
            user: new.user,
        };
        inner.records.push(comment.clone());
        drop(inner);

        tracing::debug!(target: "margin::store", id = %comment.id, "created comment");
        self.bump();
        Ok(comment)
    }

    async fn update(&self, id: &str, patch: CommentPatch) -> Result<Comment, StoreError> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.into()))?;
        if let Some(content) = patch.content {
            record.content = content;
            record.updated_at = Utc::now();
        }
        let updated = record.clone();
        drop(inner);

        self.bump();
        Ok(updated)
    }

    async fn update_status(&self, id: &str, status: CommentStatus) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.into()))?;
        if record.status == status {
            return Ok(());
        }
        if !record.status.can_transition(status) {
            return Err(StoreError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }
        record.status = status;
        record.updated_at = Utc::now();
        drop(inner);

        self.bump();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.records.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound(id.into()));
        }
        // Cascade: a thread disappears with its head.
        inner
            .records
            .retain(|c| c.id != id && c.parent_id.as_deref() != Some(id));
        drop(inner);

        self.bump();
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}
