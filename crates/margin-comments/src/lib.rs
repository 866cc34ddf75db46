//! margin-comments: comment records, thread structure and the persistence
//! contract.
//!
//! This crate owns the data side of the annotation feature:
//! - `Comment` and friends - the record shape the backend speaks
//! - `CommentThreads` - structural bookkeeping (nesting, filtering, counts)
//! - `CommentStore` - the async persistence contract, with `MemoryStore`
//!   as the reference implementation used by tests
//!
//! No anchor math lives here; anchors are bridged to `margin-core` via
//! [`Comment::anchor`].

pub mod memory;
pub mod record;
pub mod store;
pub mod thread;

pub use memory::MemoryStore;
pub use record::{Comment, CommentAuthor, CommentId, CommentStatus, ContentType};
pub use store::{CommentPatch, CommentStore, NewComment, StoreError};
pub use thread::{CommentThreads, StatusCounts};
