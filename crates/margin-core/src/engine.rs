//! Annotation engine: composition root for one annotated container.
//!
//! Owns the selection observer, the interaction gate, the layout gate and
//! one marker tracker per anchored comment. The surrounding UI feeds it
//! selection events and container snapshots, and reads back the published
//! selection, the marker position map and the drift indicator.
//!
//! Marker positions are derived values: the whole map is recomputed from
//! the stored anchors on every pass. Nothing is incrementally patched -
//! recompute-from-source-of-truth is the correctness trade-off here, since
//! incremental shifting would bypass the verification step and reintroduce
//! silent drift.

use std::collections::BTreeMap;

use smol_str::SmolStr;
use web_time::{Duration, Instant};

use crate::anchor::{MarkerState, MarkerTracker, RectQuery, StoredAnchor, resolve_anchor};
use crate::doc::RunMap;
use crate::interact::{DEFAULT_INTERACTION_TTL, InteractionGate};
use crate::layout::{DEFAULT_SETTLE_DELAY, LayoutGate};
use crate::selection::{DEFAULT_MIN_SELECTION_LEN, SelectionObserver, SelectionUpdate};
use crate::types::{MarkerRect, RawSelection, TextSelection};

/// Identifier of a comment record, as issued by the persistence layer.
pub type CommentId = SmolStr;

/// Tunables for one engine instance.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Minimum captured selection length in chars.
    pub min_selection_len: usize,
    /// Quiet period before the container layout counts as settled.
    pub settle_delay: Duration,
    /// TTL of the interaction flag.
    pub interaction_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_selection_len: DEFAULT_MIN_SELECTION_LEN,
            settle_delay: DEFAULT_SETTLE_DELAY,
            interaction_ttl: DEFAULT_INTERACTION_TTL,
        }
    }
}

/// Annotation engine for a single container.
#[derive(Debug)]
pub struct AnnotationEngine {
    config: EngineConfig,
    gate: InteractionGate,
    observer: SelectionObserver,
    layout: LayoutGate,
    trackers: BTreeMap<CommentId, (StoredAnchor, MarkerTracker)>,
    drift: bool,
}

impl AnnotationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let gate = InteractionGate::new();
        let observer = SelectionObserver::with_min_len(gate.clone(), config.min_selection_len);
        let layout = LayoutGate::new(config.settle_delay);
        Self {
            config,
            gate,
            observer,
            layout,
            trackers: BTreeMap::new(),
            drift: false,
        }
    }

    /// Handle to the shared interaction gate. Clone it into marker/popover
    /// event handlers; setting it there (synchronously, before any async
    /// work) suppresses selection handling for the TTL window.
    pub fn interaction_gate(&self) -> InteractionGate {
        self.gate.clone()
    }

    /// Convenience for marker/popover handlers: set the interaction flag
    /// with the configured TTL.
    pub fn begin_interaction(&self) {
        self.gate.set_interacting(true, self.config.interaction_ttl);
    }

    /// Mark other comment UI (popover, editor) open or closed.
    pub fn set_ui_open(&mut self, open: bool) {
        self.observer.set_ui_open(open);
    }

    /// Feed one selection-change event (see `SelectionObserver::observe`).
    pub fn handle_selection(
        &mut self,
        container_text: &str,
        runs: &RunMap,
        raw: Option<RawSelection>,
    ) -> SelectionUpdate {
        self.observer.observe(container_text, runs, raw)
    }

    /// The currently published selection, if any.
    pub fn selection(&self) -> Option<&TextSelection> {
        self.observer.selection()
    }

    /// Drop the published selection (after submit or cancel).
    pub fn clear_selection(&mut self) {
        self.observer.clear();
    }

    /// Replace the tracked anchor set from the current comment list.
    ///
    /// Trackers for unchanged anchors keep their state; new or re-anchored
    /// comments start at pending-layout, and trackers for removed comments
    /// are dropped.
    pub fn set_anchors<I>(&mut self, anchors: I)
    where
        I: IntoIterator<Item = (CommentId, StoredAnchor)>,
    {
        let mut next = BTreeMap::new();
        for (id, anchor) in anchors {
            let tracker = match self.trackers.remove(&id) {
                Some((prev_anchor, tracker)) if prev_anchor == anchor => tracker,
                _ => MarkerTracker::new(),
            };
            next.insert(id, (anchor, tracker));
        }
        self.trackers = next;
    }

    /// Report the container's content length (triggers the layout gate).
    pub fn signal_content(&mut self, container_len: usize) {
        self.layout.signal_content(container_len);
    }

    /// Report a layout-affecting mutation with no length change.
    pub fn signal_mutation(&mut self) {
        self.layout.signal_mutation();
    }

    /// Resolve every tracked anchor against the current snapshot.
    ///
    /// Before the layout settles this is a no-op returning `None` for every
    /// comment (markers stay pending rather than flashing at transient
    /// positions). Afterwards each anchor is re-verified and re-measured;
    /// the returned map holds a rectangle only for positioned markers.
    pub fn resolve_markers<R: RectQuery>(
        &mut self,
        container_text: &str,
        runs: &RunMap,
        rects: &R,
    ) -> BTreeMap<CommentId, Option<MarkerRect>> {
        self.resolve_markers_at(container_text, runs, rects, Instant::now())
    }

    /// Clock-injectable form of [`resolve_markers`](Self::resolve_markers).
    pub fn resolve_markers_at<R: RectQuery>(
        &mut self,
        container_text: &str,
        runs: &RunMap,
        rects: &R,
        now: Instant,
    ) -> BTreeMap<CommentId, Option<MarkerRect>> {
        if !self.layout.is_settled_at(now) {
            return self.trackers.keys().map(|id| (id.clone(), None)).collect();
        }

        let mut positions = BTreeMap::new();
        let mut drift = false;
        for (id, (anchor, tracker)) in &mut self.trackers {
            let outcome = resolve_anchor(anchor, container_text, runs, rects);
            if let Err(err) = &outcome {
                if err.is_drift() {
                    tracing::debug!(
                        target: "margin::anchor",
                        comment = %id,
                        error = %err,
                        "anchor drifted"
                    );
                }
            }
            let state = tracker.apply(outcome);
            drift |= state.is_drift();
            positions.insert(id.clone(), state.rect().copied());
        }
        self.drift = drift;
        positions
    }

    /// Whether any tracked anchor is currently in the drift-detected state.
    /// Drives the dismissible "some markers are missing" indicator.
    pub fn drift_detected(&self) -> bool {
        self.drift
    }

    /// Marker state for one comment, if tracked.
    pub fn marker_state(&self, id: &str) -> Option<&MarkerState> {
        self.trackers.get(id).map(|(_, tracker)| tracker.state())
    }

    /// Teardown on unmount: drops all trackers, the published selection and
    /// any pending gate deadline, and re-opens the layout gate. In-flight
    /// resolution results applied after this see an empty tracker set and
    /// write nothing.
    pub fn reset(&mut self) {
        self.trackers.clear();
        self.observer.clear();
        self.gate.clear();
        self.layout = LayoutGate::new(self.config.settle_delay);
        self.drift = false;
    }
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
