//! # Taskdeck Core
//!
//! Core traits and types for the Taskdeck state engines.
//!
//! Every feature in the workspace (counter, todo list, notification queue) is
//! expressed with the same small vocabulary:
//!
//! - **State**: plain owned data for one feature
//! - **Action**: a closed enum of everything that can happen to that state
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of side work (timers, async calls), never executed here
//! - **Environment**: injected dependencies (clock, id generation)
//!
//! The runtime crate owns the state and executes effects; this crate has no
//! knowledge of tasks, locks or storage backends.
//!
//! ## Example
//!
//! ```
//! use taskdeck_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Tally {
//!     hits: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum TallyAction {
//!     Hit,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = Tally;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Tally,
//!         action: TallyAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TallyAction>; 4]> {
//!         match action {
//!             TallyAction::Hit => state.hits += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = Tally::default();
//! TallyReducer.reduce(&mut state, TallyAction::Hit, &());
//! assert_eq!(state.hits, 1);
//! ```

// Re-export commonly used types
pub use serde_json;
pub use smallvec::{smallvec, SmallVec};

/// Reducer composition (scoping child reducers into a parent)
pub mod composition;

/// Declarative macros for building effects
pub mod effect_macros;

/// Whitelisted persistence of state slices
pub mod persist;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns effect descriptions for the
        /// runtime. Must not block, must not perform I/O.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The runtime interprets them;
/// they are composable and, when wrapped in [`Effect::Cancellable`],
/// cancellable by id.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier for a cancellable effect
    ///
    /// Two in-flight effects never share an id: starting a cancellable effect
    /// under an id that is already running cancels the older one.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EffectId(String);

    impl EffectId {
        /// Create an effect id from any string-like value
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self(id.into())
        }

        /// The id as a string slice
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// Boxed future produced by an [`Effect::Future`]
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (timeouts, expiry)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(EffectFuture<Action>),

        /// Run the inner effect under a cancellation id
        Cancellable {
            /// Id used by [`Effect::Cancel`]
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Cancel the in-flight effect registered under this id (no-op if none)
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap this effect so it can later be cancelled with [`Effect::Cancel`]
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Whether this effect does nothing at all
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                _ => false,
            }
        }

        /// Transform the actions this effect feeds back
        ///
        /// Used when a child reducer is embedded in a parent: the child's
        /// effects produce child actions, which the parent wraps in its own
        /// action type.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            Action: Send + 'static,
            B: Send + 'static,
            F: Fn(Action) -> B + Clone + Send + Sync + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
                Effect::Cancellable { id, effect } => Effect::Cancellable {
                    id,
                    effect: Box::new(effect.map(f)),
                },
                Effect::Cancel(id) => Effect::Cancel(id),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Id generation for newly created records
    pub trait IdGenerator: Send + Sync {
        /// Mint a fresh id, never returned before by this generator
        fn next_id(&self) -> String;

        /// Record an id minted elsewhere (e.g. rehydrated from storage) so it is
        /// never handed out again
        fn observe(&self, _existing: &str) {}
    }

    /// Time-derived ids: milliseconds since the epoch, bumped forward so
    /// that ids are strictly increasing even within the same millisecond
    pub struct TimeOrderedIds<C: Clock> {
        clock: C,
        last: AtomicI64,
    }

    impl<C: Clock> TimeOrderedIds<C> {
        /// Create a generator reading time from `clock`
        #[must_use]
        pub const fn new(clock: C) -> Self {
            Self {
                clock,
                last: AtomicI64::new(i64::MIN),
            }
        }
    }

    impl<C: Clock> IdGenerator for TimeOrderedIds<C> {
        fn next_id(&self) -> String {
            let now = self.clock.now().timestamp_millis();
            let mut last = self.last.load(Ordering::Acquire);
            loop {
                let candidate = now.max(last.saturating_add(1));
                match self.last.compare_exchange_weak(
                    last,
                    candidate,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return candidate.to_string(),
                    Err(actual) => last = actual,
                }
            }
        }

        fn observe(&self, existing: &str) {
            if let Ok(seen) = existing.parse::<i64>() {
                self.last.fetch_max(seen, Ordering::AcqRel);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can unwrap and panic
mod tests {
    use super::effect::{Effect, EffectId};
    use super::environment::{Clock, IdGenerator, TimeOrderedIds};
    use chrono::{DateTime, TimeZone, Utc};
    use std::time::Duration;

    struct Frozen(DateTime<Utc>);

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn frozen() -> Frozen {
        Frozen(Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap_or_default())
    }

    #[test]
    fn ids_are_strictly_increasing_within_one_millisecond() {
        let ids = TimeOrderedIds::new(frozen());
        let a: i64 = ids.next_id().parse().unwrap();
        let b: i64 = ids.next_id().parse().unwrap();
        let c: i64 = ids.next_id().parse().unwrap();
        assert_eq!(a, 1_700_000_000_000);
        assert_eq!(b, a + 1);
        assert_eq!(c, a + 2);
    }

    #[test]
    fn observed_ids_are_never_reissued() {
        let ids = TimeOrderedIds::new(frozen());
        ids.observe("1700000000500");
        ids.observe("not-a-number");
        assert_eq!(ids.next_id(), "1700000000501");
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Child {
        Tick,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn map_rewraps_delayed_actions() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(Child::Tick),
        }
        .cancellable(EffectId::new("tick"));

        match effect.map(Parent::Child) {
            Effect::Cancellable { id, effect } => {
                assert_eq!(id.as_str(), "tick");
                assert!(matches!(
                    *effect,
                    Effect::Delay { ref action, .. } if **action == Parent::Child(Child::Tick)
                ));
            },
            other => panic!("unexpected effect: {other:?}"),
        }
    }

    #[test]
    fn nested_none_is_none() {
        let effect: Effect<Child> = Effect::Parallel(vec![Effect::None, Effect::Sequential(vec![])]);
        assert!(effect.is_none());
        assert!(!Effect::<Child>::Cancel(EffectId::new("x")).is_none());
    }
}
