//! # focusquest Core Library
//!
//! This library provides the core logic for the focusquest focus timer: a
//! countdown state machine with a points/experience/level layer and
//! purchasable themes on top. Front-ends (the bundled CLI, or any other UI)
//! are thin layers over [`FocusApp`].
//!
//! ## Architecture
//!
//! - **Clock**: one-second tick source handing out cancellable subscriptions
//! - **Session Machine**: focus/break/test countdown, raises completion events
//! - **Task Ledger**: ordered task list gating focus sessions
//! - **Reward Engine**: points, experience and levels from completions
//! - **Theme Catalog**: fixed palettes unlocked with points
//!
//! ## Key Components
//!
//! - [`FocusApp`]: Facade over every component
//! - [`SessionMachine`]: Countdown state machine
//! - [`RewardEngine`]: Reward and progression rules
//! - [`Config`]: Application configuration management
//! - [`Advisor`]: Trait for the optional advisory-message service

pub mod app;
pub mod error;
pub mod events;
pub mod integrations;
pub mod reward;
pub mod storage;
pub mod task;
pub mod theme;
pub mod timer;

pub use app::FocusApp;
pub use error::{AdvisoryError, ConfigError, CoreError, PreconditionError};
pub use events::{AwardReason, Event};
pub use integrations::{advise_or_fallback, Advisor, Confirm, GeminiAdvisor, Notifier};
pub use reward::{PointsWallet, ProgressSummary, RewardEngine, RewardOutcome, RewardRules, RewardState};
pub use storage::Config;
pub use task::{Task, TaskLedger, TaskStatus, Toggle};
pub use theme::{Selection, Theme, ThemeCatalog, ThemeView, THEMES};
pub use timer::{SessionMachine, SessionMode, SessionState, Subscription, TickSource, Ticker};
