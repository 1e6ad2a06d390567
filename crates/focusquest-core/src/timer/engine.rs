//! Session machine implementation.
//!
//! A countdown in whole seconds driven by ticks from [`TickSource`]. The
//! machine has no thread of its own: the caller delivers ticks, each tagged
//! with the subscription that was active when the countdown started.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Expired
//!   ^        |           |
//!   +--------+-----------+  reset / set_mode
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = SessionMachine::with_mode(25, SessionMode::Focus);
//! let sub = session.start(&ledger)?;
//! // Once per second:
//! if let Some(Event::SessionCompleted { .. }) = session.tick(sub) { ... }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::clock::{Subscription, TickSource};
use super::mode::{format_clock, minutes_to_secs, SessionMode};
use crate::error::{PreconditionError, Result};
use crate::events::Event;
use crate::task::TaskLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    /// Countdown hit zero. Only `reset` or `set_mode` leave this state.
    Expired,
}

/// Countdown state machine for focus, break and test sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMachine {
    mode: SessionMode,
    state: SessionState,
    duration_secs: u64,
    /// Always `<= duration_secs`.
    remaining_secs: u64,
    clock: TickSource,
}

impl SessionMachine {
    /// An unconfigured machine: zero-length focus session, start is a no-op.
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Focus,
            state: SessionState::Idle,
            duration_secs: 0,
            remaining_secs: 0,
            clock: TickSource::new(),
        }
    }

    pub fn with_mode(minutes: u32, mode: SessionMode) -> Self {
        let mut machine = Self::new();
        machine.set_mode(minutes, mode);
        machine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// The subscription ticks must carry, while running.
    pub fn subscription(&self) -> Option<Subscription> {
        self.clock.active()
    }

    /// 0.0 .. 1.0 elapsed fraction; 0.0 for a zero-length session.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        (self.duration_secs - self.remaining_secs) as f64 / self.duration_secs as f64
    }

    /// Remaining time as `MM:SS`.
    pub fn clock_face(&self) -> String {
        format_clock(self.remaining_secs)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            duration_secs: self.duration_secs,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Cancel any countdown and load a fresh session of `minutes` (at least 1).
    pub fn set_mode(&mut self, minutes: u32, mode: SessionMode) -> Event {
        self.set_mode_secs(minutes_to_secs(minutes.max(1)), mode)
    }

    /// Like [`set_mode`](Self::set_mode) with a duration in seconds.
    /// Used by test mode, whose cycle is shorter than a minute.
    pub fn set_mode_secs(&mut self, secs: u64, mode: SessionMode) -> Event {
        self.clock.cancel();
        let duration_secs = secs.max(1);
        self.mode = mode;
        self.state = SessionState::Idle;
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        tracing::info!(%mode, duration_secs, "session mode set");
        Event::ModeSet {
            mode,
            duration_secs,
            at: Utc::now(),
        }
    }

    /// Start or resume the countdown.
    ///
    /// Returns `Ok(None)` when already running or when nothing is left to
    /// count. Focus sessions fail with [`PreconditionError::NoTasks`] while
    /// the ledger is empty, and the machine stays where it was.
    pub fn start(&mut self, ledger: &TaskLedger) -> Result<Option<Event>> {
        if self.state == SessionState::Running || self.remaining_secs == 0 {
            return Ok(None);
        }
        if self.mode.requires_tasks() && ledger.is_empty() {
            tracing::info!(mode = %self.mode, "start refused: task ledger is empty");
            return Err(PreconditionError::NoTasks.into());
        }
        self.state = SessionState::Running;
        let sub = self.clock.subscribe();
        tracing::info!(mode = %self.mode, remaining = self.remaining_secs, sub = sub.id(), "session started");
        Ok(Some(Event::SessionStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }))
    }

    /// Stop the countdown, keeping the remaining time. Idempotent.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }
        self.clock.cancel();
        self.state = SessionState::Paused;
        tracing::info!(remaining = self.remaining_secs, "session paused");
        Some(Event::SessionPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Back to `Idle` with the full duration, from any state.
    pub fn reset(&mut self) -> Event {
        self.clock.cancel();
        self.state = SessionState::Idle;
        self.remaining_secs = self.duration_secs;
        tracing::info!(duration_secs = self.duration_secs, "session reset");
        Event::SessionReset {
            duration_secs: self.duration_secs,
            at: Utc::now(),
        }
    }

    /// Consume one second. Returns `SessionCompleted` on the tick that
    /// reaches zero.
    ///
    /// Ticks for a subscription other than the active one are ignored.
    pub fn tick(&mut self, sub: Subscription) -> Option<Event> {
        if self.state != SessionState::Running || !self.clock.is_active(sub) {
            tracing::debug!(sub = sub.id(), "stale tick ignored");
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.clock.cancel();
        self.state = SessionState::Expired;
        tracing::info!(mode = %self.mode, "session completed");
        Some(Event::SessionCompleted {
            mode: self.mode,
            duration_secs: self.duration_secs,
            at: Utc::now(),
        })
    }

    /// Tick the active subscription, if there is one.
    pub fn tick_active(&mut self) -> Option<Event> {
        let sub = self.clock.active()?;
        self.tick(sub)
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}
