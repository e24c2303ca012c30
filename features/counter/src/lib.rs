//! # Counter
//!
//! A single persisted integer.
//!
//! The counter is a **pure state machine** with NO side effects:
//! - Every action returns `Effect::None`
//! - Arithmetic saturates at the `i64` bounds instead of overflowing
//! - Only `value` is persisted, under the `counter` namespace
//!
//! ## Example
//!
//! ```no_run
//! use counter::{CounterAction, CounterEnvironment, CounterReducer, CounterState};
//! use taskdeck_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new(CounterState::default(), CounterReducer::new(), CounterEnvironment);
//!
//! store.send(CounterAction::Increment).await?;
//! store.send(CounterAction::increment_by_text("41")).await?;
//! let value = store.state(|s| s.value).await;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use taskdeck_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use taskdeck_macros::Persist;

/// Counter state
#[derive(Persist, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[persist(key = "counter")]
pub struct CounterState {
    /// Current value
    #[persist]
    pub value: i64,
}

/// Counter actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    /// Add 1
    Increment,
    /// Subtract 1
    Decrement,
    /// Set the value back to 0
    Reset,
    /// Add an arbitrary amount (zero and negatives included)
    IncrementByAmount(i64),
}

impl CounterAction {
    /// `IncrementByAmount` from user-entered text (see [`parse_amount`])
    #[must_use]
    pub fn increment_by_text(text: &str) -> Self {
        Self::IncrementByAmount(parse_amount(text))
    }
}

/// Parse user-entered text as an amount
///
/// Surrounding whitespace is ignored. Empty or non-numeric text is 0; it is
/// never an error.
///
/// ```
/// assert_eq!(counter::parse_amount(" 25 "), 25);
/// assert_eq!(counter::parse_amount("-3"), -3);
/// assert_eq!(counter::parse_amount(""), 0);
/// assert_eq!(counter::parse_amount("ten"), 0);
/// ```
#[must_use]
pub fn parse_amount(text: &str) -> i64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    trimmed.parse().unwrap_or_else(|error| {
        tracing::debug!(input = trimmed, %error, "Amount is not an integer, using 0");
        0
    })
}

/// Counter environment
///
/// The counter needs no injected dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterEnvironment;

/// Counter reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterReducer;

impl CounterReducer {
    /// Create a new counter reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;
    type Environment = CounterEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _environment: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CounterAction::Increment => {
                state.value = state.value.saturating_add(1);
            },
            CounterAction::Decrement => {
                state.value = state.value.saturating_sub(1);
            },
            CounterAction::Reset => {
                state.value = 0;
            },
            CounterAction::IncrementByAmount(amount) => {
                state.value = state.value.saturating_add(amount);
            },
        }

        // Pure state machine - no side effects
        smallvec![Effect::None]
    }
}
