//! Taskdeck: a counter and a todo list with persisted state, self-expiring
//! notifications and a confirmation step before destructive actions.
//!
//! The crate wires the feature engines together:
//!
//! - [`reducer`]: the application reducer composing counter, todo and
//!   notification engines, plus the intent layer (validation, notifications,
//!   milestones, clear confirmation)
//! - [`session`]: rehydration, the store and the persistence observer
//! - [`command`] and [`view`]: the terminal front end
//! - [`config`]: environment-based configuration

pub mod command;
pub mod config;
pub mod milestone;
pub mod reducer;
pub mod session;
pub mod view;

pub use command::{Command, CommandError};
pub use config::{AppConfig, ConfigError};
pub use milestone::{MilestoneTracker, MILESTONE_STEP};
pub use reducer::{clear_prompt, AppAction, AppEnvironment, AppReducer, AppState};
pub use session::{AppStore, Session};
pub use view::render;
