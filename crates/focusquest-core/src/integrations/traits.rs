use async_trait::async_trait;
use std::time::Duration;

use crate::error::AdvisoryError;
use crate::reward::ProgressSummary;
use crate::theme::Theme;

/// Shown when the advisory service answered with nothing usable.
pub const EMPTY_ADVICE_FALLBACK: &str = "No advisory message available.";

/// Shown when the advisory service could not be reached in time.
pub const FAILED_ADVICE_FALLBACK: &str = "Could not fetch advisory message.";

/// Announcements to the user (session complete, level up, distraction alert).
pub trait Notifier {
    fn notify(&self, message: &str);

    /// The active theme changed and the UI should repaint with it.
    fn theme_applied(&self, _theme: &Theme) {}
}

/// Synchronous yes/no question to the user.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// Produces a short motivational message from the user's progress.
///
/// Implementations may be slow or fail; callers go through
/// [`advise_or_fallback`] so neither ever reaches core state.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Unique identifier (e.g. "gemini").
    fn name(&self) -> &str;

    async fn advise(&self, summary: &ProgressSummary) -> Result<String, AdvisoryError>;
}

/// Ask `advisor` for a message, substituting a fixed string on error,
/// timeout or an empty answer.
pub async fn advise_or_fallback(
    advisor: &dyn Advisor,
    summary: &ProgressSummary,
    timeout: Duration,
) -> String {
    let result = match tokio::time::timeout(timeout, advisor.advise(summary)).await {
        Ok(result) => result,
        Err(_) => Err(AdvisoryError::Timeout {
            timeout_secs: timeout.as_secs(),
        }),
    };
    match result {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) | Err(AdvisoryError::EmptyResponse) => {
            tracing::warn!(advisor = advisor.name(), "advisor returned no text");
            EMPTY_ADVICE_FALLBACK.to_string()
        }
        Err(e) => {
            tracing::warn!(advisor = advisor.name(), error = %e, "advisor request failed");
            FAILED_ADVICE_FALLBACK.to_string()
        }
    }
}

/// Notifier that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) {}
}

/// Confirm that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

/// Advisor that always answers with the same text, without any I/O.
#[derive(Debug, Clone, Default)]
pub struct StaticAdvisor {
    pub message: String,
}

#[async_trait]
impl Advisor for StaticAdvisor {
    fn name(&self) -> &str {
        "static"
    }

    async fn advise(&self, _summary: &ProgressSummary) -> Result<String, AdvisoryError> {
        if self.message.is_empty() {
            return Err(AdvisoryError::EmptyResponse);
        }
        Ok(self.message.clone())
    }
}
