//! Selection observer: turns raw selection-change events into verified
//! `TextSelection` values.
//!
//! The platform layer normalizes each native event into a [`RawSelection`]
//! (start node ordinal, in-node offset, selected text, flags); the observer
//! owns the decision of whether that becomes the published selection.
//! Every failure path resolves to "no selection" - precision over
//! availability - because a wrong anchor silently corrupts all future
//! marker placement for the comment created from it.

use crate::doc::RunMap;
use crate::interact::InteractionGate;
use crate::types::{RawSelection, TextSelection};

/// Minimum captured selection length in chars. Anchoring one or two
/// accidentally-brushed characters produces markers nobody intended.
pub const DEFAULT_MIN_SELECTION_LEN: usize = 3;

/// Outcome of one selection-change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Gated out (interaction in flight or comment UI open); published
    /// state untouched.
    Ignored,
    /// Published state unchanged by this event.
    Unchanged,
    /// The pending selection was cleared.
    Cleared,
    /// A new verified selection was captured.
    Captured(TextSelection),
}

/// Observes selection-change events scoped to one container.
#[derive(Clone, Debug)]
pub struct SelectionObserver {
    gate: InteractionGate,
    min_len: usize,
    /// True while a popover/editor is open; suppresses capture the same way
    /// the gate does, but without a TTL.
    ui_open: bool,
    current: Option<TextSelection>,
}

impl SelectionObserver {
    pub fn new(gate: InteractionGate) -> Self {
        Self::with_min_len(gate, DEFAULT_MIN_SELECTION_LEN)
    }

    pub fn with_min_len(gate: InteractionGate, min_len: usize) -> Self {
        Self {
            gate,
            min_len,
            ui_open: false,
            current: None,
        }
    }

    /// The currently published selection, if any.
    pub fn selection(&self) -> Option<&TextSelection> {
        self.current.as_ref()
    }

    /// Mark other comment UI (popover, editor) open or closed.
    pub fn set_ui_open(&mut self, open: bool) {
        self.ui_open = open;
    }

    /// Drop the published selection (e.g. after the comment was submitted).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Handle one selection-change event.
    ///
    /// `container_text` and `runs` must come from the same container
    /// snapshot; `raw` is `None` when the platform reported no selection at
    /// all.
    pub fn observe(
        &mut self,
        container_text: &str,
        runs: &RunMap,
        raw: Option<RawSelection>,
    ) -> SelectionUpdate {
        if self.gate.is_interacting() || self.ui_open {
            tracing::trace!(
                target: "margin::selection",
                ui_open = self.ui_open,
                "selection event suppressed by interaction gate"
            );
            return SelectionUpdate::Ignored;
        }

        let candidate = raw.and_then(|raw| self.capture(container_text, runs, raw));
        match (candidate, &self.current) {
            (None, None) => SelectionUpdate::Unchanged,
            (None, Some(_)) => {
                self.current = None;
                SelectionUpdate::Cleared
            }
            (Some(sel), Some(current)) if *current == sel => SelectionUpdate::Unchanged,
            (Some(sel), _) => {
                tracing::debug!(
                    target: "margin::selection",
                    start = sel.start,
                    end = sel.end,
                    "captured selection"
                );
                self.current = Some(sel.clone());
                SelectionUpdate::Captured(sel)
            }
        }
    }

    fn capture(
        &self,
        container_text: &str,
        runs: &RunMap,
        raw: RawSelection,
    ) -> Option<TextSelection> {
        if raw.collapsed || raw.text.is_empty() {
            return None;
        }
        if !raw.in_container {
            return None;
        }

        let lookup = match raw.node {
            Some(node) => runs.position_to_offset(node, raw.offset_in_node),
            // Start node not found by the platform walk: reduced-confidence
            // fallback straight to the total length. Verification below is
            // what actually decides.
            None => crate::doc::OffsetLookup {
                offset: runs.total_len(),
                exact: false,
            },
        };
        if !lookup.exact {
            tracing::trace!(
                target: "margin::selection",
                offset = lookup.offset,
                "inexact offset lookup for selection start"
            );
        }

        let sel = match TextSelection::capture(container_text, lookup.offset, &raw.text) {
            Some(sel) => sel,
            None => {
                // Expected transient noise from rapid selection changes;
                // discard silently, never publish an unverified anchor.
                tracing::trace!(
                    target: "margin::selection",
                    start = lookup.offset,
                    text_len = raw.text.len(),
                    "selection failed verification, discarding"
                );
                return None;
            }
        };

        if sel.len() < self.min_len {
            return None;
        }
        Some(sel)
    }
}
