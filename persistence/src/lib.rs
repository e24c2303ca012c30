//! # Taskdeck Persistence
//!
//! Durable storage for whitelisted state slices.
//!
//! - [`FileStorage`]: one `<key>.json` file per namespace in a data directory
//! - [`rehydrate`]: restore a slice at startup, falling back to defaults
//! - [`PersistenceObserver`]: mirrors slices to storage after every transition
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskdeck_persistence::{rehydrate, FileStorage, PersistenceObserver};
//!
//! let storage = FileStorage::new(".taskdeck");
//!
//! let mut state = AppState::default();
//! rehydrate(&storage, &mut state.todo).await;
//! rehydrate(&storage, &mut state.counter).await;
//!
//! let store = Store::new(state, AppReducer::new(), env);
//!
//! let persistence = Arc::new(
//!     PersistenceObserver::builder()
//!         .slice(|s: &AppState| &s.todo)
//!         .slice(|s: &AppState| &s.counter)
//!         .spawn(storage),
//! );
//! store.state(|s| persistence.prime(s)).await;
//!
//! let observer = Arc::clone(&persistence);
//! store.observe(move |s| observer.record(s));
//! ```

/// File-backed storage
pub mod file;

/// Background persistence of state slices
pub mod observer;

/// Startup restore
pub mod rehydrate;

pub use file::FileStorage;
pub use observer::{PersistenceBuilder, PersistenceObserver, WriterReport};
pub use rehydrate::{rehydrate, Rehydration};
