//! Integration tests for the session machine and reward engine working
//! together through the `FocusApp` facade.
//!
//! Covers:
//! | Area     | Property                                                     |
//! |----------|--------------------------------------------------------------|
//! | Session  | d ticks drive a d-second session to 0, one completion event  |
//! | Session  | pause/start resumes without skipping or repeating seconds    |
//! | Session  | stale subscriptions never move the countdown                 |
//! | Tasks    | Pending->Done->Pending->Done pays the bonus twice            |
//! | Rewards  | break reward precedence: duration > parity > base            |
//! | Levels   | 65 experience from level 1 lands on level 3 with 5 left      |
//! | Themes   | owned theme is free; locked theme with 19 points is refused  |

use focusquest_core::integrations::{FixedAnswer, SilentNotifier};
use focusquest_core::{
    Config, CoreError, Event, FocusApp, PreconditionError, RewardEngine, RewardRules, RewardState,
    SessionMachine, SessionMode, SessionState, TaskLedger, TaskStatus,
};
use proptest::prelude::*;

fn app() -> FocusApp<SilentNotifier> {
    FocusApp::new(&Config::default(), SilentNotifier)
}

fn completions(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::SessionCompleted { .. }))
        .count()
}

#[test]
fn focus_start_with_empty_ledger_stays_idle() {
    let mut app = app();
    let err = app.start().unwrap_err();
    assert!(matches!(err, CoreError::Precondition(PreconditionError::NoTasks)));
    assert_eq!(app.session().state(), SessionState::Idle);
    assert_eq!(app.remaining_secs(), 25 * 60);
}

#[test]
fn pause_then_start_resumes_exactly() {
    let mut app = app();
    app.add_task("draft outline");
    app.set_mode(1, SessionMode::Focus);
    app.start().unwrap();

    for _ in 0..20 {
        app.tick_active();
    }
    let stale = app.session().subscription().unwrap();
    app.pause();
    assert_eq!(app.remaining_secs(), 40);

    // A tick that was already in flight when we paused is dropped.
    assert!(app.tick(stale).is_empty());
    assert_eq!(app.remaining_secs(), 40);

    app.start().unwrap();
    let mut events = Vec::new();
    let mut ticks = 0;
    while app.session().is_running() {
        events.extend(app.tick_active());
        ticks += 1;
    }
    assert_eq!(ticks, 40);
    assert_eq!(completions(&events), 1);
}

#[test]
fn set_mode_cancels_running_countdown() {
    let mut app = app();
    app.add_task("a");
    app.start_focus(Some(1)).unwrap();
    let old = app.session().subscription().unwrap();

    app.set_mode(5, SessionMode::Break);
    assert_eq!(app.session().state(), SessionState::Idle);
    assert!(app.tick(old).is_empty());
    assert_eq!(app.remaining_secs(), 300);
}

#[test]
fn toggling_back_and_forth_pays_twice() {
    let mut app = app();
    app.add_task("ship it");

    app.toggle_task(0).unwrap();
    app.toggle_task(0).unwrap();
    app.toggle_task(0).unwrap();

    assert_eq!(app.tasks().get(0).unwrap().status, TaskStatus::Done);
    assert_eq!(app.reward_state().points, 20);
    assert_eq!(app.reward_state().experience, 20);
}

#[test]
fn toggle_out_of_range_is_index_error() {
    let mut app = app();
    app.add_task("only one");
    let err = app.toggle_task(3).unwrap_err();
    assert!(matches!(err, CoreError::Index { index: 3, len: 1 }));
    assert_eq!(app.reward_state().points, 0);
}

#[test]
fn break_reward_precedence() {
    let engine = |sprints, minutes| {
        RewardEngine::with_state(
            RewardRules::default(),
            RewardState {
                focus_sprints_completed: sprints,
                last_focus_duration_minutes: minutes,
                ..RewardState::default()
            },
        )
    };
    assert_eq!(engine(2, 25).compute_break_reward(), 20);
    assert_eq!(engine(2, 10).compute_break_reward(), 15);
    assert_eq!(engine(1, 10).compute_break_reward(), 10);
}

#[test]
fn sixty_five_experience_is_two_levels() {
    let mut engine = RewardEngine::default();
    let outcome = engine.add_experience(65);
    assert_eq!(engine.state().level, 3);
    assert_eq!(engine.state().experience, 5);
    let levels: Vec<u32> = outcome
        .events
        .iter()
        .filter_map(|e| match e {
            Event::LeveledUp { level, .. } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![2, 3]);
}

#[test]
fn owned_theme_is_free_and_locked_theme_needs_twenty() {
    let mut app = app();
    app.select_theme("light", &FixedAnswer(true)).unwrap();
    assert_eq!(app.reward_state().points, 0);

    app.add_task("a");
    app.toggle_task(0).unwrap();
    let err = app.select_theme("ocean", &FixedAnswer(true)).unwrap_err();
    assert!(matches!(err, CoreError::InsufficientPoints { needed: 20, available: 10 }));
    assert!(!app.themes().is_unlocked("ocean"));
}

#[test]
fn nineteen_points_cannot_unlock() {
    let mut catalog = focusquest_core::ThemeCatalog::default();
    let mut wallet = RewardEngine::with_state(
        RewardRules::default(),
        RewardState {
            points: 19,
            ..RewardState::default()
        },
    );
    let err = catalog
        .select("sakura", &mut wallet, &FixedAnswer(true))
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientPoints { .. }));
    assert_eq!(wallet.state().points, 19);
}

#[test]
fn full_day_flow() {
    let mut app = app();
    app.add_task("email");
    app.add_task("report");

    // 25 minute focus -> 20 points, 5 xp.
    app.start_focus(None).unwrap();
    while app.session().is_running() {
        app.tick_active();
    }
    // Long focus earns the top break reward.
    assert_eq!(app.break_reward_preview(), 20);
    app.start_break(None).unwrap();
    while app.session().is_running() {
        app.tick_active();
    }
    app.toggle_task(0).unwrap();
    app.toggle_task(1).unwrap();

    let state = app.reward_state();
    assert_eq!(state.points, 20 + 20 + 10 + 10);
    assert_eq!(state.level, 1);
    assert_eq!(state.experience, 25);
    assert_eq!(state.focus_sprints_completed, 1);
    assert_eq!(state.break_sessions_completed, 1);

    app.select_theme("midnight", &FixedAnswer(true)).unwrap();
    assert_eq!(app.reward_state().points, 40);
    assert_eq!(app.themes().selected().id, "midnight");
}

proptest! {
    #[test]
    fn d_ticks_complete_exactly_once(secs in 1u64..400) {
        let mut session = SessionMachine::new();
        session.set_mode_secs(secs, SessionMode::Break);
        session.start(&TaskLedger::new()).unwrap();
        let sub = session.subscription().unwrap();

        let mut done = 0;
        for _ in 0..secs {
            if session.tick(sub).is_some() {
                done += 1;
            }
        }
        prop_assert_eq!(session.remaining_secs(), 0);
        prop_assert_eq!(done, 1);
        prop_assert_eq!(session.state(), SessionState::Expired);

        // Extra ticks after expiry do nothing.
        prop_assert!(session.tick(sub).is_none());
    }

    #[test]
    fn pause_points_do_not_change_total_ticks(secs in 2u64..200, pauses in proptest::collection::vec(0u64..200, 0..5)) {
        let mut session = SessionMachine::new();
        session.set_mode_secs(secs, SessionMode::Test);
        let ledger = TaskLedger::new();
        session.start(&ledger).unwrap();

        let mut ticks = 0u64;
        while session.is_running() {
            if pauses.contains(&ticks) {
                session.pause();
                prop_assert!(session.tick_active().is_none());
                session.start(&ledger).unwrap();
            }
            session.tick_active();
            ticks += 1;
        }
        prop_assert_eq!(ticks, secs);
    }

    #[test]
    fn experience_stays_below_threshold(awards in proptest::collection::vec(0u32..200, 1..20), threshold in 1u32..100) {
        let rules = RewardRules { level_threshold: threshold, ..RewardRules::default() };
        let mut engine = RewardEngine::new(rules);
        let mut total = 0u64;
        for amount in awards {
            engine.add_experience(amount);
            total += amount as u64;
            prop_assert!(engine.state().experience < threshold);
        }
        let state = engine.state();
        prop_assert_eq!(
            (state.level as u64 - 1) * threshold as u64 + state.experience as u64,
            total
        );
    }
}
