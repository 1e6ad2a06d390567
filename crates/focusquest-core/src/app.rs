//! Application facade.
//!
//! `FocusApp` owns every component and is the only thing a UI talks to.
//! Each call runs to completion: events come back in the order they
//! happened, and announcements go out through the [`Notifier`] the app was
//! built with.

use crate::error::Result;
use crate::events::Event;
use crate::integrations::{Confirm, Notifier};
use crate::reward::{PointsWallet, ProgressSummary, RewardEngine, RewardOutcome, RewardState};
use crate::storage::{Config, TimerConfig};
use crate::task::TaskLedger;
use crate::theme::{Selection, ThemeCatalog, ThemeView};
use crate::timer::{SessionMachine, SessionMode, Subscription};

pub const DISTRACTION_MESSAGE: &str = "Stay focused! Your session isn't over yet.";

pub struct FocusApp<N: Notifier> {
    timer_config: TimerConfig,
    session: SessionMachine,
    tasks: TaskLedger,
    rewards: RewardEngine,
    themes: ThemeCatalog,
    notifier: N,
}

impl<N: Notifier> FocusApp<N> {
    /// Fresh app with a default-length focus session loaded.
    pub fn new(config: &Config, notifier: N) -> Self {
        let mut app = Self {
            timer_config: config.timer.clone(),
            session: SessionMachine::new(),
            tasks: TaskLedger::new(),
            rewards: RewardEngine::new(config.rewards.clone()),
            themes: ThemeCatalog::with_default(
                config.themes.unlock_cost,
                &config.themes.default_theme,
            ),
            notifier,
        };
        app.set_mode(config.timer.focus_minutes, SessionMode::Focus);
        app
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    pub fn tasks(&self) -> &TaskLedger {
        &self.tasks
    }

    pub fn reward_state(&self) -> &RewardState {
        self.rewards.state()
    }

    pub fn themes(&self) -> &ThemeCatalog {
        &self.themes
    }

    pub fn theme_views(&self) -> Vec<ThemeView> {
        self.themes.views()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn remaining_secs(&self) -> u64 {
        self.session.remaining_secs()
    }

    pub fn clock_face(&self) -> String {
        self.session.clock_face()
    }

    pub fn progress(&self) -> f64 {
        self.session.progress()
    }

    /// Points the next completed break would earn.
    pub fn break_reward_preview(&self) -> u32 {
        self.rewards.compute_break_reward()
    }

    pub fn break_reward_hint(&self) -> String {
        format!(
            "Taking a break now can earn you +{} points!",
            self.break_reward_preview()
        )
    }

    /// Input for the advisory collaborator.
    pub fn progress_summary(&self) -> ProgressSummary {
        ProgressSummary::new(&self.tasks, self.rewards.state())
    }

    // ── Session commands ─────────────────────────────────────────────

    /// Load a new session, cancelling any countdown in flight.
    pub fn set_mode(&mut self, minutes: u32, mode: SessionMode) -> Event {
        let event = self.session.set_mode(minutes, mode);
        if mode == SessionMode::Focus {
            self.rewards.note_focus_duration(minutes.max(1));
        }
        event
    }

    /// Set up and start a focus session; `None` uses the configured length.
    pub fn start_focus(&mut self, minutes: Option<u32>) -> Result<Vec<Event>> {
        let minutes = minutes.unwrap_or(self.timer_config.focus_minutes);
        self.set_mode_and_start(minutes, SessionMode::Focus)
    }

    /// Set up and start a break; `None` uses the configured length.
    pub fn start_break(&mut self, minutes: Option<u32>) -> Result<Vec<Event>> {
        let minutes = minutes.unwrap_or(self.timer_config.break_minutes);
        self.set_mode_and_start(minutes, SessionMode::Break)
    }

    /// Run the short verification cycle.
    pub fn start_test(&mut self) -> Result<Vec<Event>> {
        let mut events = vec![self
            .session
            .set_mode_secs(self.timer_config.test_seconds, SessionMode::Test)];
        events.extend(self.session.start(&self.tasks)?);
        Ok(events)
    }

    pub fn start(&mut self) -> Result<Option<Event>> {
        self.session.start(&self.tasks)
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.session.pause()
    }

    pub fn reset(&mut self) -> Event {
        self.session.reset()
    }

    /// Deliver one clock tick. On expiry, rewards are applied and the user
    /// is told about the completion and any level reached.
    pub fn tick(&mut self, sub: Subscription) -> Vec<Event> {
        let Some(completed) = self.session.tick(sub) else {
            return Vec::new();
        };
        let mode = self.session.mode();
        let outcome = self.rewards.on_session_completed(mode, &self.tasks);
        self.notifier.notify(&mode.completion_message(outcome.points));
        self.announce_level(&outcome);

        let mut events = vec![completed];
        events.extend(outcome.events);
        events
    }

    /// Tick the active subscription, if any.
    pub fn tick_active(&mut self) -> Vec<Event> {
        match self.session.subscription() {
            Some(sub) => self.tick(sub),
            None => Vec::new(),
        }
    }

    /// The UI lost the user's attention (window hidden, tab switched).
    /// Returns whether a reminder went out.
    pub fn on_focus_lost(&self) -> bool {
        if self.session.is_running() && self.session.mode() == SessionMode::Focus {
            self.notifier.notify(DISTRACTION_MESSAGE);
            return true;
        }
        false
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn add_task(&mut self, text: &str) -> Option<Event> {
        self.tasks.add_task(text)
    }

    pub fn toggle_task(&mut self, index: usize) -> Result<Vec<Event>> {
        let toggle = self.tasks.toggle_task(index)?;
        let outcome = self.rewards.on_task_toggled(toggle.previous, toggle.current);
        self.announce_level(&outcome);

        let mut events = vec![toggle.to_event()];
        events.extend(outcome.events);
        Ok(events)
    }

    // ── Theme commands ───────────────────────────────────────────────

    /// Whether [`select_theme`](Self::select_theme) would ask `confirm`
    /// for `id` given the current balance.
    pub fn theme_needs_confirmation(&self, id: &str) -> bool {
        self.themes.needs_confirmation(id, self.rewards.balance())
    }

    /// Apply or buy a theme. The notifier is asked to repaint whenever the
    /// active theme changes.
    pub fn select_theme(&mut self, id: &str, confirm: &dyn Confirm) -> Result<Selection> {
        let selection = self.themes.select(id, &mut self.rewards, confirm)?;
        if !matches!(selection, Selection::Declined) {
            self.notifier.theme_applied(self.themes.selected());
        }
        Ok(selection)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_mode_and_start(&mut self, minutes: u32, mode: SessionMode) -> Result<Vec<Event>> {
        let mut events = vec![self.set_mode(minutes, mode)];
        events.extend(self.session.start(&self.tasks)?);
        Ok(events)
    }

    /// One message per award, however many levels it crossed.
    fn announce_level(&self, outcome: &RewardOutcome) {
        if let Some(level) = outcome.leveled_to() {
            self.notifier
                .notify(&format!("Level up! You are now level {level}."));
        }
    }
}
