//! Input health data model: heartbeat/signal recency and the availability rule.

use std::time::{Duration, Instant};

/// Recency tracking for one input.
///
/// All evaluation time is passed in explicitly so callers (and tests) control
/// the clock. An input with no recorded frames is never available.
#[derive(Clone, Debug)]
pub struct InputHealth {
    window: Duration,
    last_heartbeat: Option<Instant>,
    last_signal_ok: Option<Instant>,
}

impl InputHealth {
    /// Creates health state for one input with the given failover window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_heartbeat: None,
            last_signal_ok: None,
        }
    }

    /// Records one received frame at `now`.
    ///
    /// The heartbeat always advances; the signal timestamp advances only when
    /// the caller judged the frame's signal indicator ok.
    pub fn record_frame(&mut self, now: Instant, signal_ok: bool) {
        self.last_heartbeat = Some(now);
        if signal_ok {
            self.last_signal_ok = Some(now);
        }
    }

    /// True iff both the heartbeat and the signal timestamp are within the
    /// failover window of `now`.
    pub fn is_available(&self, now: Instant) -> bool {
        self.within_window(self.last_heartbeat, now) && self.within_window(self.last_signal_ok, now)
    }

    fn within_window(&self, stamp: Option<Instant>, now: Instant) -> bool {
        match stamp {
            Some(stamp) => now.saturating_duration_since(stamp) <= self.window,
            None => false,
        }
    }
}
