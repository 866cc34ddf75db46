//! Interaction gate: mutual exclusion between marker interactions and
//! selection handling.
//!
//! Clicking a marker or opening a popover fires DOM events on the same
//! region the selection observer watches; without a gate, opening a popover
//! to reply to one comment can be misread as a fresh text selection and
//! anchor the next comment in the wrong place. The gate is set synchronously
//! inside the interaction's event handler - before any async work - so a
//! selection-change event dispatched in the same tick is reliably
//! suppressed.
//!
//! The flag auto-expires after a TTL, so a caller that forgets to clear it
//! can never permanently disable selection handling.

use std::sync::{Arc, Mutex};

use web_time::{Duration, Instant};

/// Default time-to-live for the interacting flag.
pub const DEFAULT_INTERACTION_TTL: Duration = Duration::from_millis(900);

#[derive(Debug, Default)]
struct GateInner {
    active_until: Option<Instant>,
}

/// Shared, TTL-guarded "user is engaging comment UI" flag.
///
/// Clones share state: a gate cloned into a marker subtree observes (and is
/// observed by) every sibling holding the same handle within the session.
/// It is scoped to the annotation subsystem's lifetime, not process-global.
#[derive(Clone, Debug, Default)]
pub struct InteractionGate {
    inner: Arc<Mutex<GateInner>>,
}

impl InteractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the interacting flag. Setting starts (or refreshes) the
    /// expiry deadline `ttl` from now.
    pub fn set_interacting(&self, active: bool, ttl: Duration) {
        self.set_interacting_at(active, ttl, Instant::now());
    }

    /// Whether an interaction is currently in flight (deadline not passed).
    pub fn is_interacting(&self) -> bool {
        self.is_interacting_at(Instant::now())
    }

    /// Drop any pending deadline. Called on teardown so no timer outlives
    /// the container.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("interaction gate poisoned");
        inner.active_until = None;
    }

    /// Clock-injectable form of [`set_interacting`](Self::set_interacting).
    pub fn set_interacting_at(&self, active: bool, ttl: Duration, now: Instant) {
        let mut inner = self.inner.lock().expect("interaction gate poisoned");
        inner.active_until = active.then(|| now + ttl);
        tracing::trace!(
            target: "margin::interact",
            active,
            ttl_ms = ttl.as_millis() as u64,
            "interaction gate updated"
        );
    }

    /// Clock-injectable form of [`is_interacting`](Self::is_interacting).
    pub fn is_interacting_at(&self, now: Instant) -> bool {
        let inner = self.inner.lock().expect("interaction gate poisoned");
        matches!(inner.active_until, Some(deadline) if now < deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_inactive() {
        let gate = InteractionGate::new();
        assert!(!gate.is_interacting());
    }

    #[test]
    fn test_gate_expires_after_ttl() {
        let gate = InteractionGate::new();
        let t0 = Instant::now();
        gate.set_interacting_at(true, Duration::from_millis(900), t0);

        assert!(gate.is_interacting_at(t0));
        assert!(gate.is_interacting_at(t0 + Duration::from_millis(899)));
        assert!(!gate.is_interacting_at(t0 + Duration::from_millis(900)));
        assert!(!gate.is_interacting_at(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_gate_refresh_extends_deadline() {
        let gate = InteractionGate::new();
        let t0 = Instant::now();
        gate.set_interacting_at(true, Duration::from_millis(900), t0);
        let t1 = t0 + Duration::from_millis(500);
        gate.set_interacting_at(true, Duration::from_millis(900), t1);

        assert!(gate.is_interacting_at(t0 + Duration::from_millis(1300)));
        assert!(!gate.is_interacting_at(t1 + Duration::from_millis(900)));
    }

    #[test]
    fn test_gate_explicit_clear_wins_over_ttl() {
        let gate = InteractionGate::new();
        let t0 = Instant::now();
        gate.set_interacting_at(true, Duration::from_secs(60), t0);
        gate.set_interacting_at(false, Duration::ZERO, t0);
        assert!(!gate.is_interacting_at(t0));
    }

    #[test]
    fn test_clones_share_state() {
        let gate = InteractionGate::new();
        let sibling = gate.clone();
        let t0 = Instant::now();
        gate.set_interacting_at(true, Duration::from_millis(900), t0);
        assert!(sibling.is_interacting_at(t0));

        sibling.clear();
        assert!(!gate.is_interacting_at(t0));
    }
}
