//! Reward engine: points, experience and levels.
//!
//! Points are the spendable currency (themes cost points). Experience is a
//! progression currency that converts into levels every
//! [`RewardRules::level_threshold`] points and is never spent.
//!
//! Awards:
//!
//! | Event                 | Points                       | Experience |
//! |-----------------------|------------------------------|------------|
//! | Focus completed       | 20                           | 5          |
//! | Break completed       | 10 / 15 / 20 (see below)     | 0          |
//! | Task Pending -> Done  | 10                           | 10         |
//! | Task Done -> Pending  | 0 (nothing is revoked)       | 0          |
//! | Test completed        | 0                            | 0          |

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::{AwardReason, Event};
use crate::task::{TaskLedger, TaskStatus};
use crate::timer::SessionMode;

/// Tunable award amounts. Defaults are the shipped game balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRules {
    #[serde(default = "default_focus_points")]
    pub focus_points: u32,
    #[serde(default = "default_focus_experience")]
    pub focus_experience: u32,
    #[serde(default = "default_task_points")]
    pub task_points: u32,
    #[serde(default = "default_task_experience")]
    pub task_experience: u32,
    #[serde(default = "default_level_threshold")]
    pub level_threshold: u32,
    #[serde(default = "default_break_base")]
    pub break_base: u32,
    /// Break reward when the number of completed sprints is even.
    #[serde(default = "default_break_even_sprints")]
    pub break_even_sprints: u32,
    /// Break reward after a long focus session. Wins over the parity bonus.
    #[serde(default = "default_break_long_focus")]
    pub break_long_focus: u32,
    #[serde(default = "default_long_focus_minutes")]
    pub long_focus_minutes: u32,
}

fn default_focus_points() -> u32 {
    20
}
fn default_focus_experience() -> u32 {
    5
}
fn default_task_points() -> u32 {
    10
}
fn default_task_experience() -> u32 {
    10
}
fn default_level_threshold() -> u32 {
    30
}
fn default_break_base() -> u32 {
    10
}
fn default_break_even_sprints() -> u32 {
    15
}
fn default_break_long_focus() -> u32 {
    20
}
fn default_long_focus_minutes() -> u32 {
    25
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            focus_points: default_focus_points(),
            focus_experience: default_focus_experience(),
            task_points: default_task_points(),
            task_experience: default_task_experience(),
            level_threshold: default_level_threshold(),
            break_base: default_break_base(),
            break_even_sprints: default_break_even_sprints(),
            break_long_focus: default_break_long_focus(),
            long_focus_minutes: default_long_focus_minutes(),
        }
    }
}

/// Progression state for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardState {
    pub points: u32,
    /// Always below the level threshold.
    pub experience: u32,
    /// Starts at 1.
    pub level: u32,
    pub focus_sprints_completed: u32,
    pub break_sessions_completed: u32,
    pub last_focus_duration_minutes: u32,
}

impl Default for RewardState {
    fn default() -> Self {
        Self {
            points: 0,
            experience: 0,
            level: 1,
            focus_sprints_completed: 0,
            break_sessions_completed: 0,
            last_focus_duration_minutes: 0,
        }
    }
}

/// Input for the advisory collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub tasks_done: usize,
    pub tasks_total: usize,
    pub sprints_completed: u32,
}

impl ProgressSummary {
    pub fn new(ledger: &TaskLedger, state: &RewardState) -> Self {
        Self {
            tasks_done: ledger.done_count(),
            tasks_total: ledger.len(),
            sprints_completed: state.focus_sprints_completed,
        }
    }
}

/// What a single event earned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardOutcome {
    pub points: u32,
    pub experience: u32,
    /// Points, experience and level-up events in the order they happened.
    pub events: Vec<Event>,
}

impl RewardOutcome {
    /// Level reached if this outcome levelled up at least once.
    pub fn leveled_to(&self) -> Option<u32> {
        Event::final_level(&self.events)
    }

    pub fn level_ups(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::LeveledUp { .. }))
            .count()
    }
}

/// Spendable balance, as seen by the theme catalog.
pub trait PointsWallet {
    fn balance(&self) -> u32;

    /// Remove `amount` points. Fails without change if the balance is short.
    fn debit(&mut self, amount: u32) -> Result<Event>;
}

#[derive(Debug, Clone, Default)]
pub struct RewardEngine {
    rules: RewardRules,
    state: RewardState,
}

impl RewardEngine {
    pub fn new(rules: RewardRules) -> Self {
        Self {
            rules,
            state: RewardState::default(),
        }
    }

    pub fn with_state(rules: RewardRules, state: RewardState) -> Self {
        Self { rules, state }
    }

    pub fn state(&self) -> &RewardState {
        &self.state
    }

    pub fn rules(&self) -> &RewardRules {
        &self.rules
    }

    /// Remember the length of the focus session just configured.
    pub fn note_focus_duration(&mut self, minutes: u32) {
        self.state.last_focus_duration_minutes = minutes;
    }

    /// Apply the award for a session that ran out.
    ///
    /// `tasks` is only read to log where the user stands; it never changes
    /// the award.
    pub fn on_session_completed(&mut self, mode: SessionMode, tasks: &TaskLedger) -> RewardOutcome {
        let mut outcome = RewardOutcome::default();
        match mode {
            SessionMode::Focus => {
                self.state.focus_sprints_completed += 1;
                self.award_points(self.rules.focus_points, AwardReason::FocusCompleted, &mut outcome);
                self.award_experience(self.rules.focus_experience, &mut outcome);
            }
            SessionMode::Break => {
                self.state.break_sessions_completed += 1;
                let reward = self.compute_break_reward();
                self.award_points(reward, AwardReason::BreakCompleted, &mut outcome);
            }
            SessionMode::Test => {}
        }
        tracing::info!(
            %mode,
            points = outcome.points,
            experience = outcome.experience,
            tasks_done = tasks.done_count(),
            tasks_total = tasks.len(),
            "session rewards applied"
        );
        outcome
    }

    /// Apply the award for a task toggle. Only Pending -> Done earns; going
    /// back to Pending does not take anything away.
    pub fn on_task_toggled(&mut self, previous: TaskStatus, current: TaskStatus) -> RewardOutcome {
        let mut outcome = RewardOutcome::default();
        if previous == TaskStatus::Pending && current == TaskStatus::Done {
            self.award_points(self.rules.task_points, AwardReason::TaskCompleted, &mut outcome);
            self.award_experience(self.rules.task_experience, &mut outcome);
        }
        outcome
    }

    /// Points the next completed break will earn.
    ///
    /// Long last focus wins, then an even sprint count, then the base.
    pub fn compute_break_reward(&self) -> u32 {
        if self.state.last_focus_duration_minutes >= self.rules.long_focus_minutes {
            self.rules.break_long_focus
        } else if self.state.focus_sprints_completed % 2 == 0 {
            self.rules.break_even_sprints
        } else {
            self.rules.break_base
        }
    }

    /// Add experience and convert every full threshold into a level.
    pub fn add_experience(&mut self, amount: u32) -> RewardOutcome {
        let mut outcome = RewardOutcome::default();
        self.award_experience(amount, &mut outcome);
        outcome
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn award_points(&mut self, amount: u32, reason: AwardReason, outcome: &mut RewardOutcome) {
        self.state.points = self.state.points.saturating_add(amount);
        outcome.points += amount;
        outcome.events.push(Event::PointsAwarded {
            amount,
            reason,
            balance: self.state.points,
            at: Utc::now(),
        });
    }

    fn award_experience(&mut self, amount: u32, outcome: &mut RewardOutcome) {
        if amount == 0 {
            return;
        }
        let threshold = self.rules.level_threshold.max(1);
        let total = self.state.experience.saturating_add(amount);
        let from = self.state.level;
        self.state.level = from.saturating_add(total / threshold);
        self.state.experience = total % threshold;

        outcome.experience = outcome.experience.saturating_add(amount);
        outcome.events.push(Event::ExperienceAwarded {
            amount,
            experience: self.state.experience,
            at: Utc::now(),
        });
        if self.state.level > from {
            tracing::info!(from, to = self.state.level, "leveled up");
        }
        let at = Utc::now();
        outcome.events.extend(
            (from..self.state.level).map(|level| Event::LeveledUp { level: level + 1, at }),
        );
    }
}

impl PointsWallet for RewardEngine {
    fn balance(&self) -> u32 {
        self.state.points
    }

    fn debit(&mut self, amount: u32) -> Result<Event> {
        if self.state.points < amount {
            return Err(CoreError::InsufficientPoints {
                needed: amount,
                available: self.state.points,
            });
        }
        self.state.points -= amount;
        Ok(Event::PointsSpent {
            amount,
            balance: self.state.points,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(sprints: u32, last_focus: u32) -> RewardEngine {
        RewardEngine::with_state(
            RewardRules::default(),
            RewardState {
                focus_sprints_completed: sprints,
                last_focus_duration_minutes: last_focus,
                ..RewardState::default()
            },
        )
    }

    #[test]
    fn break_reward_long_focus_wins() {
        assert_eq!(engine_with(2, 25).compute_break_reward(), 20);
        assert_eq!(engine_with(1, 40).compute_break_reward(), 20);
    }

    #[test]
    fn break_reward_even_sprints() {
        assert_eq!(engine_with(2, 10).compute_break_reward(), 15);
        assert_eq!(engine_with(0, 0).compute_break_reward(), 15);
    }

    #[test]
    fn break_reward_base() {
        assert_eq!(engine_with(1, 10).compute_break_reward(), 10);
        assert_eq!(engine_with(3, 24).compute_break_reward(), 10);
    }

    #[test]
    fn focus_completion_awards_points_and_experience() {
        let mut engine = RewardEngine::default();
        let outcome = engine.on_session_completed(SessionMode::Focus, &TaskLedger::new());
        assert_eq!(outcome.points, 20);
        assert_eq!(outcome.experience, 5);
        assert_eq!(engine.state().points, 20);
        assert_eq!(engine.state().experience, 5);
        assert_eq!(engine.state().focus_sprints_completed, 1);
    }

    #[test]
    fn break_completion_uses_break_reward() {
        let mut engine = engine_with(1, 10);
        let outcome = engine.on_session_completed(SessionMode::Break, &TaskLedger::new());
        assert_eq!(outcome.points, 10);
        assert_eq!(outcome.experience, 0);
        assert_eq!(engine.state().break_sessions_completed, 1);
    }

    #[test]
    fn test_completion_changes_nothing() {
        let mut engine = RewardEngine::default();
        let before = engine.state().clone();
        let outcome = engine.on_session_completed(SessionMode::Test, &TaskLedger::new());
        assert!(outcome.events.is_empty());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn task_completion_is_asymmetric() {
        let mut engine = RewardEngine::default();
        let done = engine.on_task_toggled(TaskStatus::Pending, TaskStatus::Done);
        assert_eq!((done.points, done.experience), (10, 10));
        let undone = engine.on_task_toggled(TaskStatus::Done, TaskStatus::Pending);
        assert_eq!((undone.points, undone.experience), (0, 0));
        assert_eq!(engine.state().points, 10);
    }

    #[test]
    fn large_award_levels_up_repeatedly() {
        let mut engine = RewardEngine::default();
        let outcome = engine.add_experience(65);
        assert_eq!(engine.state().level, 3);
        assert_eq!(engine.state().experience, 5);
        assert_eq!(outcome.level_ups(), 2);
        assert_eq!(outcome.leveled_to(), Some(3));
    }

    #[test]
    fn exact_threshold_levels_up() {
        let mut engine = RewardEngine::default();
        engine.add_experience(30);
        assert_eq!(engine.state().level, 2);
        assert_eq!(engine.state().experience, 0);
    }

    #[test]
    fn threshold_of_one_with_big_award() {
        let rules = RewardRules {
            level_threshold: 1,
            ..RewardRules::default()
        };
        let mut engine = RewardEngine::new(rules);
        let outcome = engine.add_experience(100_000);
        assert_eq!(engine.state().level, 100_001);
        assert_eq!(engine.state().experience, 0);
        assert_eq!(outcome.level_ups(), 100_000);
        assert_eq!(outcome.leveled_to(), Some(100_001));
    }

    #[test]
    fn level_saturates_instead_of_overflowing() {
        let rules = RewardRules {
            level_threshold: 1,
            ..RewardRules::default()
        };
        let mut engine = RewardEngine::with_state(
            rules,
            RewardState {
                level: u32::MAX - 1,
                experience: u32::MAX,
                ..RewardState::default()
            },
        );
        let outcome = engine.add_experience(10);
        assert_eq!(engine.state().level, u32::MAX);
        assert_eq!(engine.state().experience, 0);
        assert_eq!(outcome.level_ups(), 1);
    }

    #[test]
    fn experience_event_reports_stored_value() {
        let mut engine = RewardEngine::default();
        let outcome = engine.add_experience(35);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, Event::ExperienceAwarded { amount: 35, experience: 5, .. })));
    }

    #[test]
    fn debit_requires_balance() {
        let mut engine = RewardEngine::with_state(
            RewardRules::default(),
            RewardState {
                points: 19,
                ..RewardState::default()
            },
        );
        let err = engine.debit(20).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPoints { needed: 20, available: 19 }));
        assert_eq!(engine.balance(), 19);

        engine.on_task_toggled(TaskStatus::Pending, TaskStatus::Done);
        engine.debit(20).unwrap();
        assert_eq!(engine.balance(), 9);
    }

    #[test]
    fn summary_reads_ledger_and_sprints() {
        let mut ledger = TaskLedger::new();
        ledger.add_task("a");
        ledger.add_task("b");
        ledger.toggle_task(1).unwrap();
        let state = RewardState {
            focus_sprints_completed: 4,
            ..RewardState::default()
        };
        let summary = ProgressSummary::new(&ledger, &state);
        assert_eq!(summary.tasks_done, 1);
        assert_eq!(summary.tasks_total, 2);
        assert_eq!(summary.sprints_completed, 4);
    }
}
