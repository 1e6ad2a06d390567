use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of countdown the session machine is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Focus,
    Break,
    /// Short verification cycle. Completes like the others but earns nothing.
    Test,
}

impl SessionMode {
    /// Whether starting this mode requires a non-empty task ledger.
    pub fn requires_tasks(&self) -> bool {
        matches!(self, SessionMode::Focus)
    }

    /// Message shown to the user when a session of this mode runs out.
    pub fn completion_message(&self, break_reward: u32) -> String {
        match self {
            SessionMode::Focus => "Focus complete! Take a break?".to_string(),
            SessionMode::Break => format!("Break's over! You earned +{break_reward} points!"),
            SessionMode::Test => "Test complete!".to_string(),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Focus => write!(f, "focus"),
            SessionMode::Break => write!(f, "break"),
            SessionMode::Test => write!(f, "test"),
        }
    }
}

/// Whole minutes to seconds, saturating on overflow.
pub fn minutes_to_secs(minutes: u32) -> u64 {
    (minutes as u64).saturating_mul(60)
}

/// Format seconds as a zero-padded `MM:SS` clock face.
///
/// Minutes are not wrapped at 60, so a 90 minute session reads `90:00`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_focus_requires_tasks() {
        assert!(SessionMode::Focus.requires_tasks());
        assert!(!SessionMode::Break.requires_tasks());
        assert!(!SessionMode::Test.requires_tasks());
    }

    #[test]
    fn clock_face_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(90 * 60 + 9), "90:09");
    }

    #[test]
    fn break_message_mentions_reward() {
        assert_eq!(
            SessionMode::Break.completion_message(15),
            "Break's over! You earned +15 points!"
        );
        assert_eq!(SessionMode::Test.completion_message(15), "Test complete!");
    }

    #[test]
    fn mode_serializes_lowercase() {
        let json = serde_json::to_string(&SessionMode::Break).unwrap();
        assert_eq!(json, "\"break\"");
    }
}
