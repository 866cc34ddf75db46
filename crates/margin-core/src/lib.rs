//! margin-core: platform-independent inline annotation logic.
//!
//! This crate provides:
//! - `RunMap` - bidirectional mapping between text-node positions and flat offsets
//! - `SelectionObserver` - verified capture of native text selections
//! - `resolve_anchor` / `MarkerTracker` - marker placement with drift detection
//! - `InteractionGate` - TTL-guarded suppression of selection handling
//! - `AnnotationEngine` - composition root the surrounding UI talks to
//!
//! Everything is expressed over char offsets and a `RectQuery` trait, so the
//! whole engine runs (and is tested) without a DOM. The browser side lives in
//! `margin-browser`.

pub mod anchor;
pub mod doc;
pub mod engine;
pub mod error;
pub mod interact;
pub mod layout;
pub mod selection;
pub mod text;
pub mod types;

pub use anchor::{MarkerState, MarkerTracker, RectQuery, StoredAnchor, resolve_anchor};
pub use doc::{DocPosition, OffsetLookup, RunMap, TextNodeIndex};
pub use engine::{AnnotationEngine, CommentId, EngineConfig};
pub use error::ResolveError;
pub use interact::{DEFAULT_INTERACTION_TTL, InteractionGate};
pub use layout::{DEFAULT_SETTLE_DELAY, LayoutGate};
pub use selection::{DEFAULT_MIN_SELECTION_LEN, SelectionObserver, SelectionUpdate};
pub use smol_str::SmolStr;
pub use text::{char_len, char_slice};
pub use types::{MarkerRect, RawSelection, TextSelection};
