//! margin-browser: DOM layer for the margin annotation engine.
//!
//! Bridges `margin-core`'s platform-independent offsets to the live DOM:
//! - `TextWalk` - snapshot of a container's text nodes as a `RunMap`
//! - `read_raw_selection` - native selection into a `RawSelection`
//! - `SelectionListener` - RAII `selectionchange` subscription
//! - `DomRects` - `RectQuery` backed by DOM ranges
//!
//! The container subtree is read-only from this crate's perspective: it
//! reads text content and selection ranges and measures rectangles; marker
//! elements are overlaid by the caller, never inserted into the content.

pub mod dom;
pub mod rects;
pub mod selection;

pub use dom::TextWalk;
pub use rects::DomRects;
pub use selection::{SelectionListener, read_raw_selection};
