//! One-second tick source.
//!
//! The clock never mutates session state itself. It hands out
//! [`Subscription`] tokens and the session machine only honours ticks that
//! carry the currently active token. Cancelling a subscription therefore
//! makes every tick already in flight for it a no-op, which is what keeps a
//! stale countdown from firing after `pause`, `reset` or `set_mode`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Fixed cadence of the countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Token identifying one run of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription(u64);

impl Subscription {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Hands out subscriptions; at most one is active at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickSource {
    next_id: u64,
    active: Option<Subscription>,
}

impl TickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new subscription, replacing any active one.
    pub fn subscribe(&mut self) -> Subscription {
        self.next_id += 1;
        let sub = Subscription(self.next_id);
        if let Some(old) = self.active.replace(sub) {
            tracing::debug!(old = old.id(), new = sub.id(), "tick subscription replaced");
        } else {
            tracing::debug!(id = sub.id(), "tick subscription started");
        }
        sub
    }

    /// Cancel the active subscription, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(old) = self.active.take() {
            tracing::debug!(id = old.id(), "tick subscription cancelled");
        }
    }

    pub fn active(&self) -> Option<Subscription> {
        self.active
    }

    pub fn is_active(&self, sub: Subscription) -> bool {
        self.active == Some(sub)
    }
}

/// Async driver producing one tick per [`TICK_PERIOD`].
///
/// Missed ticks are delayed rather than burst, so a stalled event loop never
/// delivers several seconds of countdown at once.
pub struct Ticker {
    inner: Interval,
}

impl Ticker {
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        let mut inner = interval(period);
        inner.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick lands one period out, not immediately.
        inner.reset();
        Self { inner }
    }

    /// Wait for the next tick.
    pub async fn next(&mut self) {
        self.inner.tick().await;
    }

    /// Start a fresh period now. Call whenever a countdown starts or
    /// resumes so its first second is a whole one.
    pub fn restart(&mut self) {
        self.inner.reset();
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}
