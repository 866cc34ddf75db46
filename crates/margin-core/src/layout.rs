//! Layout-settled gate for marker resolution.
//!
//! Marker rectangles queried mid-reflow (sibling images still loading,
//! fonts swapping) are transiently wrong and flash on screen. Resolution is
//! therefore deferred behind a two-phase `Pending -> Settled` gate: any
//! content signal marks the layout dirty, and the gate settles once no new
//! signal has arrived for the settle delay. A single debounced signal
//! replaces nested ad hoc timers, and the explicit `now` parameters keep
//! the settle condition testable without wall-clock sleeps.

use web_time::{Duration, Instant};

/// Default quiet period before the layout counts as settled.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pending { since: Instant },
    Settled,
}

/// Debounced two-phase layout gate.
#[derive(Clone, Debug)]
pub struct LayoutGate {
    phase: Phase,
    settle_delay: Duration,
    /// Container char length at the last signal, to coalesce signals that
    /// did not actually change the content.
    last_len: Option<usize>,
}

impl LayoutGate {
    /// A gate that starts pending (nothing is resolved before the first
    /// settle window after mount).
    pub fn new(settle_delay: Duration) -> Self {
        Self::new_at(settle_delay, Instant::now())
    }

    /// Clock-injectable constructor.
    pub fn new_at(settle_delay: Duration, now: Instant) -> Self {
        Self {
            phase: Phase::Pending { since: now },
            settle_delay,
            last_len: None,
        }
    }

    /// Report the container's current content length. A changed length
    /// re-opens the pending phase; an unchanged one leaves the gate alone.
    pub fn signal_content(&mut self, container_len: usize) {
        self.signal_content_at(container_len, Instant::now());
    }

    /// Report a layout-affecting event with no length change (mutation
    /// observer fired, container resized).
    pub fn signal_mutation(&mut self) {
        self.signal_mutation_at(Instant::now());
    }

    /// Whether resolution may run now.
    pub fn is_settled(&mut self) -> bool {
        self.is_settled_at(Instant::now())
    }

    /// Clock-injectable form of [`signal_content`](Self::signal_content).
    pub fn signal_content_at(&mut self, container_len: usize, now: Instant) {
        if self.last_len == Some(container_len) {
            return;
        }
        tracing::trace!(
            target: "margin::layout",
            container_len,
            "content length changed, layout pending"
        );
        self.last_len = Some(container_len);
        self.phase = Phase::Pending { since: now };
    }

    /// Clock-injectable form of [`signal_mutation`](Self::signal_mutation).
    pub fn signal_mutation_at(&mut self, now: Instant) {
        self.phase = Phase::Pending { since: now };
    }

    /// Clock-injectable form of [`is_settled`](Self::is_settled). Performs
    /// the pending -> settled transition when the quiet period has elapsed.
    pub fn is_settled_at(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Settled => true,
            Phase::Pending { since } => {
                if now.duration_since(since) >= self.settle_delay {
                    self.phase = Phase::Settled;
                    true
                } else {
                    false
                }
            }
        }
    }
}

impl Default for LayoutGate {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending_then_settles() {
        let t0 = Instant::now();
        let mut gate = LayoutGate::new_at(Duration::from_millis(150), t0);
        assert!(!gate.is_settled_at(t0));
        assert!(!gate.is_settled_at(t0 + Duration::from_millis(149)));
        assert!(gate.is_settled_at(t0 + Duration::from_millis(150)));
        // Stays settled without new signals.
        assert!(gate.is_settled_at(t0 + Duration::from_millis(151)));
    }

    #[test]
    fn test_content_change_reopens() {
        let t0 = Instant::now();
        let mut gate = LayoutGate::new_at(Duration::from_millis(150), t0);
        gate.signal_content_at(100, t0);
        assert!(gate.is_settled_at(t0 + Duration::from_millis(150)));

        let t1 = t0 + Duration::from_millis(200);
        gate.signal_content_at(140, t1);
        assert!(!gate.is_settled_at(t1));
        assert!(gate.is_settled_at(t1 + Duration::from_millis(150)));
    }

    #[test]
    fn test_unchanged_length_does_not_reopen() {
        let t0 = Instant::now();
        let mut gate = LayoutGate::new_at(Duration::from_millis(150), t0);
        gate.signal_content_at(100, t0);
        assert!(gate.is_settled_at(t0 + Duration::from_millis(150)));

        gate.signal_content_at(100, t0 + Duration::from_millis(200));
        assert!(gate.is_settled_at(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_rapid_signals_debounce() {
        let t0 = Instant::now();
        let mut gate = LayoutGate::new_at(Duration::from_millis(150), t0);
        // Async sibling content trickling in: each signal restarts the window.
        gate.signal_content_at(10, t0);
        gate.signal_content_at(20, t0 + Duration::from_millis(100));
        gate.signal_content_at(30, t0 + Duration::from_millis(200));
        assert!(!gate.is_settled_at(t0 + Duration::from_millis(300)));
        assert!(gate.is_settled_at(t0 + Duration::from_millis(350)));
    }

    #[test]
    fn test_mutation_signal_reopens() {
        let t0 = Instant::now();
        let mut gate = LayoutGate::new_at(Duration::from_millis(150), t0);
        gate.signal_content_at(100, t0);
        assert!(gate.is_settled_at(t0 + Duration::from_millis(150)));

        let t1 = t0 + Duration::from_millis(300);
        gate.signal_mutation_at(t1);
        assert!(!gate.is_settled_at(t1));
        assert!(gate.is_settled_at(t1 + Duration::from_millis(150)));
    }
}
