//! Error types for anchor resolution.

use thiserror::Error;

/// Why an anchor could not be resolved to a marker rectangle.
///
/// All variants are recovered locally by the caller - a failed resolve hides
/// one marker, it never crashes the rendering of unrelated comments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    /// The container text has shrunk or changed shape since the anchor was
    /// stored; the offsets no longer fit. Never clamped.
    #[error("anchor {start}..{end} out of bounds for container of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// The offsets are in bounds but the text at them is no longer what was
    /// selected - the surrounding content changed length upstream.
    #[error("anchored text no longer matches the stored selection")]
    TextMismatch,

    /// Valid offsets but no renderable rectangle (node detached, collapsed
    /// layout). Treated like drift for display purposes: hide the marker.
    #[error("no renderable rectangle for anchor range")]
    NoRect,
}

impl ResolveError {
    /// Whether this failure means the underlying content drifted (as opposed
    /// to a transient layout problem). Drift is surfaced to the user;
    /// resolution failures are not.
    pub fn is_drift(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::TextMismatch)
    }
}
