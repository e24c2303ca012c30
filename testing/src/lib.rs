//! # Taskdeck Testing
//!
//! Testing utilities and helpers for the Taskdeck state engines.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clock, ids)
//! - An in-memory [`Storage`](taskdeck_core::persist::Storage) with failure injection
//! - A Given-When-Then harness for reducers
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use taskdeck_testing::{test_clock, SequentialIds};
//! use taskdeck_runtime::Store;
//!
//! #[tokio::test]
//! async fn adds_a_todo() {
//!     let env = TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIds::new()));
//!     let store = Store::new(TodoState::default(), TodoReducer::new(), env);
//!
//!     store.send(TodoAction::AddTodo { text: "Milk".into() }).await?;
//!
//!     let count = store.state(|s| s.todos.len()).await;
//!     assert_eq!(count, 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use taskdeck_core::environment::{Clock, IdGenerator};


/// In-memory storage backend
pub mod storage_mocks;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_testing::mocks::FixedClock;
    /// use taskdeck_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `"1"`, `"2"`, `"3"`, ...
    ///
    /// Ids observed through [`IdGenerator::observe`] are skipped, like the
    /// production generator does after rehydration.
    ///
    /// ```
    /// use taskdeck_testing::SequentialIds;
    /// use taskdeck_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIds::new();
    /// assert_eq!(ids.next_id(), "1");
    /// ids.observe("41");
    /// assert_eq!(ids.next_id(), "42");
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        last: AtomicU64,
    }

    impl SequentialIds {
        /// Start counting from 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                last: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            (self.last.fetch_add(1, Ordering::SeqCst) + 1).to_string()
        }

        fn observe(&self, existing: &str) {
            if let Ok(seen) = existing.parse::<u64>() {
                self.last.fetch_max(seen, Ordering::SeqCst);
            }
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    /// Route `tracing` output to the test harness's captured stdout
    ///
    /// Honors `RUST_LOG`. Safe to call from every test; only the first call
    /// installs the subscriber.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing strategies using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Text with at least one non-whitespace character
    pub fn meaningful_text() -> impl Strategy<Value = String> {
        "[ \t]{0,2}[A-Za-z0-9][A-Za-z0-9 ,.!?-]{0,30}"
    }

    /// Empty or whitespace-only text
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t\n]{0,6}"
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, SequentialIds};
pub use reducer_test::{assertions, ReducerTest};
pub use storage_mocks::InMemoryStorage;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn sequential_ids_skip_observed() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "1");
        ids.observe("7");
        ids.observe("3");
        assert_eq!(ids.next_id(), "8");
    }

    proptest! {
        #[test]
        fn meaningful_text_is_never_blank(text in properties::meaningful_text()) {
            prop_assert!(!text.trim().is_empty());
        }

        #[test]
        fn blank_text_trims_to_empty(text in properties::blank_text()) {
            prop_assert!(text.trim().is_empty());
        }
    }
}
