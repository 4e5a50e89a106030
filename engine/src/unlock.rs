//! Unlock timers for the gated windows.

use std::time::{Duration, Instant};

/// Countdown gating one late window (D or E).
///
/// The timer is plain state: the host loop advances it through
/// [`tick`](Self::tick) with the current instant, so tests can simulate
/// elapsed time and teardown is simply dropping the owner - no periodic work
/// to cancel. Once unlocked the state is terminal; further ticks are no-ops
/// and `unlocked` never reverts.
#[derive(Debug, Clone)]
pub struct UnlockTimer {
    start: Instant,
    threshold: Duration,
    remaining: Duration,
    unlocked: bool,
}

impl UnlockTimer {
    #[must_use]
    pub fn new(threshold: Duration, now: Instant) -> Self {
        Self {
            start: now,
            threshold,
            remaining: threshold,
            unlocked: threshold.is_zero(),
        }
    }

    /// Recompute remaining time; latch `unlocked` when it reaches zero.
    pub fn tick(&mut self, now: Instant) {
        if self.unlocked {
            return;
        }
        let elapsed = now.saturating_duration_since(self.start);
        self.remaining = self.threshold.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.unlocked = true;
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    #[must_use]
    pub const fn unlocked(&self) -> bool {
        self.unlocked
    }
}
