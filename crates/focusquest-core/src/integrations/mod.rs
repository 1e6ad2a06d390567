pub mod gemini;
pub mod traits;

pub use gemini::GeminiAdvisor;
pub use traits::{
    advise_or_fallback, Advisor, Confirm, FixedAnswer, Notifier, SilentNotifier, StaticAdvisor,
    EMPTY_ADVICE_FALLBACK, FAILED_ADVICE_FALLBACK,
};
