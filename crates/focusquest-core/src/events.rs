use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;
use crate::timer::{SessionMode, SessionState};

/// Every state change in the system produces an Event.
/// The UI collaborator renders from them; the reward engine consumes the
/// completion and toggle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ModeSet {
        mode: SessionMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionStarted {
        mode: SessionMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. Emitted exactly once per run.
    SessionCompleted {
        mode: SessionMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TaskAdded {
        index: usize,
        text: String,
        at: DateTime<Utc>,
    },
    TaskToggled {
        index: usize,
        previous: TaskStatus,
        current: TaskStatus,
        at: DateTime<Utc>,
    },
    PointsAwarded {
        amount: u32,
        reason: AwardReason,
        balance: u32,
        at: DateTime<Utc>,
    },
    ExperienceAwarded {
        amount: u32,
        experience: u32,
        at: DateTime<Utc>,
    },
    /// One per threshold crossed.
    LeveledUp {
        level: u32,
        at: DateTime<Utc>,
    },
    PointsSpent {
        amount: u32,
        balance: u32,
        at: DateTime<Utc>,
    },
    ThemeUnlocked {
        id: String,
        at: DateTime<Utc>,
    },
    ThemeSelected {
        id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        mode: SessionMode,
        remaining_secs: u64,
        duration_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}

/// Why points were granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardReason {
    FocusCompleted,
    BreakCompleted,
    TaskCompleted,
}

impl Event {
    /// Final level reached if this batch contains level-ups.
    ///
    /// Collaborators use this to collapse several `LeveledUp` events from one
    /// award into a single announcement.
    pub fn final_level(events: &[Event]) -> Option<u32> {
        events.iter().rev().find_map(|e| match e {
            Event::LeveledUp { level, .. } => Some(*level),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_level_picks_last_level_up() {
        let at = Utc::now();
        let events = vec![
            Event::LeveledUp { level: 2, at },
            Event::ExperienceAwarded { amount: 65, experience: 5, at },
            Event::LeveledUp { level: 3, at },
        ];
        assert_eq!(Event::final_level(&events), Some(3));
        assert_eq!(Event::final_level(&events[1..2]), None);
    }

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::ThemeSelected {
            id: "ocean".into(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ThemeSelected");
        assert_eq!(json["id"], "ocean");
    }
}
