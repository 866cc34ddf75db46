//! Core annotation types: captured selections, raw platform input, marker rects.
//!
//! These types are framework-agnostic; the browser layer produces
//! `RawSelection` values and consumes `MarkerRect` values, everything in
//! between stays in plain Rust.

use smol_str::SmolStr;

use crate::doc::TextNodeIndex;
use crate::text::{char_len, char_slice};

/// A verified text selection inside the annotation container.
///
/// Invariant: `0 <= start < end <= len(container_text)` and the char slice
/// `container_text[start..end]` equals `text` at the moment of capture.
/// Values are only constructed through [`TextSelection::capture`], which
/// enforces this - an unverifiable selection is discarded, never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSelection {
    /// Char offset where the selection starts (inclusive).
    pub start: usize,
    /// Char offset where the selection ends (exclusive).
    pub end: usize,
    /// The selected text, as captured.
    pub text: SmolStr,
}

impl TextSelection {
    /// Capture a selection, verifying it against the container text.
    ///
    /// Returns `None` when the offsets are out of bounds, empty, or when the
    /// substring at `start..end` does not equal `text`.
    pub fn capture(container_text: &str, start: usize, text: &str) -> Option<Self> {
        let end = start + char_len(text);
        if start >= end {
            return None;
        }
        let actual = char_slice(container_text, start..end)?;
        if actual != text {
            return None;
        }
        Some(Self {
            start,
            end,
            text: SmolStr::new(text),
        })
    }

    /// Selection length in chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false: empty selections are never captured.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Re-check the invariant against a (possibly newer) container snapshot.
    pub fn still_valid(&self, container_text: &str) -> bool {
        char_slice(container_text, self.start..self.end) == Some(self.text.as_str())
    }
}

/// A native selection as normalized by the platform layer, before any
/// verification. One value per selection-change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSelection {
    /// Document-order index of the text node the selection starts in, if the
    /// platform walk found it. `None` means the start node was not under the
    /// container walk (reduced confidence; verification decides).
    pub node: Option<TextNodeIndex>,
    /// Char offset of the selection start within that node.
    pub offset_in_node: usize,
    /// The selected text as reported by the platform.
    pub text: SmolStr,
    /// Whether the native selection is collapsed (caret only).
    pub collapsed: bool,
    /// Whether the selection's common ancestor is inside the container.
    pub in_container: bool,
}

/// Container-relative marker rectangle, in pixels.
///
/// Derived, never persisted: it is owned by the render pass that produced it
/// and is stale after any mutation to the container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl MarkerRect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// A zero-by-zero rect carries no usable position.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}
