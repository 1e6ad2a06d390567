pub mod clock;
mod engine;
mod mode;

pub use clock::{Subscription, TickSource, Ticker, TICK_PERIOD};
pub use engine::{SessionMachine, SessionState};
pub use mode::{format_clock, minutes_to_secs, SessionMode};
