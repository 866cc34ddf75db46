//! Anchor resolution: stored offsets -> on-screen marker rectangle, with
//! drift detection.
//!
//! Resolution always recomputes from the authoritative stored
//! `(start, end, selected_text)` triple against the current container
//! snapshot. There is no incremental shifting of previously-resolved
//! positions: when the text under an anchor changes, the anchor fails
//! closed (marker hidden) instead of guessing a new position.

use smol_str::SmolStr;

use crate::doc::{DocPosition, RunMap};
use crate::error::ResolveError;
use crate::text::{char_len, char_slice};
use crate::types::MarkerRect;

/// Platform side of resolution: rectangle for a node-position range,
/// relative to the container. `None` when the range cannot be measured
/// (nodes detached, no layout).
pub trait RectQuery {
    fn range_rect(&self, start: DocPosition, end: DocPosition) -> Option<MarkerRect>;
}

/// The persisted anchor triple of a top-level comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAnchor {
    /// Char offset where the selection started (inclusive).
    pub start: usize,
    /// Char offset where the selection ended (exclusive).
    pub end: usize,
    /// The text that was selected at capture time. Optional for records
    /// predating text verification; without it only bounds checks apply.
    pub text: Option<SmolStr>,
}

impl StoredAnchor {
    pub fn new(start: usize, end: usize, text: impl Into<SmolStr>) -> Self {
        Self {
            start,
            end,
            text: Some(text.into()),
        }
    }
}

/// Resolve a stored anchor against the current container snapshot.
///
/// `container_text` and `runs` must describe the same snapshot. The
/// returned rectangle is container-relative and valid only for the current
/// paint cycle.
pub fn resolve_anchor<R: RectQuery>(
    anchor: &StoredAnchor,
    container_text: &str,
    runs: &RunMap,
    rects: &R,
) -> Result<MarkerRect, ResolveError> {
    let len = char_len(container_text);
    if anchor.start >= anchor.end || anchor.end > len {
        // The document shrank or the record is malformed; never clamp and
        // render at a wrong position.
        return Err(ResolveError::OutOfBounds {
            start: anchor.start,
            end: anchor.end,
            len,
        });
    }

    if let Some(stored) = &anchor.text {
        let current = char_slice(container_text, anchor.start..anchor.end)
            .ok_or(ResolveError::TextMismatch)?;
        if current != stored.as_str() {
            tracing::debug!(
                target: "margin::anchor",
                start = anchor.start,
                end = anchor.end,
                "stored text no longer matches container, reporting drift"
            );
            return Err(ResolveError::TextMismatch);
        }
    }

    let start_pos = runs
        .offset_to_position(anchor.start)
        .ok_or(ResolveError::NoRect)?;
    let end_pos = runs
        .offset_to_position(anchor.end)
        .ok_or(ResolveError::NoRect)?;

    let rect = rects
        .range_rect(start_pos, end_pos)
        .ok_or(ResolveError::NoRect)?;
    if rect.is_degenerate() {
        return Err(ResolveError::NoRect);
    }
    Ok(rect)
}

/// Display state of one comment's marker.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkerState {
    /// Waiting for the first resolve after layout settles.
    PendingLayout,
    /// Anchor resolved and verified; rect is current for this paint cycle.
    Positioned(MarkerRect),
    /// The underlying content drifted; marker withheld, drift surfaced to
    /// the user.
    DriftDetected,
    /// Drift persisted or resolution keeps failing; marker hidden.
    Hidden,
}

impl MarkerState {
    pub fn rect(&self) -> Option<&MarkerRect> {
        match self {
            Self::Positioned(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn is_drift(&self) -> bool {
        matches!(self, Self::DriftDetected)
    }
}

/// Per-comment marker state machine.
///
/// Transitions on every resolution pass:
/// - success -> `Positioned`. This includes recovering from
///   `DriftDetected` when an undo restores the original text: the stored
///   coordinates were never altered, and the resolve re-verified them.
/// - drift from pending/positioned -> `DriftDetected`; a second
///   consecutive failing pass -> `Hidden`.
/// - resolution failure (no rectangle) -> `Hidden`.
#[derive(Clone, Debug)]
pub struct MarkerTracker {
    state: MarkerState,
}

impl Default for MarkerTracker {
    fn default() -> Self {
        Self {
            state: MarkerState::PendingLayout,
        }
    }
}

impl MarkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MarkerState {
        &self.state
    }

    /// Fold one resolution outcome into the state machine.
    pub fn apply(&mut self, outcome: Result<MarkerRect, ResolveError>) -> &MarkerState {
        self.state = match (outcome, &self.state) {
            (Ok(rect), _) => MarkerState::Positioned(rect),
            (Err(err), MarkerState::PendingLayout | MarkerState::Positioned(_))
                if err.is_drift() =>
            {
                MarkerState::DriftDetected
            }
            // Drift persisted, or the rect query failed: hide.
            (Err(_), _) => MarkerState::Hidden,
        };
        &self.state
    }
}
