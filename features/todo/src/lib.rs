//! Todo list state engine.
//!
//! An ordered list of todos plus the view's filter mode and search term.
//!
//! - Todos keep insertion order; toggling and editing mutate in place
//! - Ids come from the injected [`IdGenerator`](taskdeck_core::environment::IdGenerator)
//! - Unknown ids are silent no-ops
//! - Only `todos` is persisted (namespace `todo`); filter and search always
//!   start empty
//!
//! Text validation (non-empty after trimming) belongs to the caller: the
//! reducer stores whatever it is given.
//!
//! # Quick Start
//!
//! ```no_run
//! use todo::{TodoAction, TodoEnvironment, TodoReducer, TodoState, TodoStats};
//! use taskdeck_core::environment::{SystemClock, TimeOrderedIds};
//! use taskdeck_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(TimeOrderedIds::new(SystemClock)),
//! );
//! let store = Store::new(TodoState::default(), TodoReducer::new(), env);
//!
//! store.send(TodoAction::AddTodo { text: "Buy milk".to_string() }).await?;
//!
//! let stats = store.state(|s| TodoStats::from(s.todos.as_slice())).await;
//! println!("{} of {} done", stats.completed, stats.total);
//! # Ok(())
//! # }
//! ```

pub mod reducer;
pub mod selectors;
pub mod types;

// Re-export commonly used types
pub use reducer::{TodoEnvironment, TodoReducer};
pub use selectors::{filtered_todos, TodoStats};
pub use types::{Filter, Todo, TodoAction, TodoId, TodoState, UnknownFilter};
