//! Reducer composition utilities
//!
//! A parent feature embeds child features with [`scope`], which focuses a
//! child reducer on a field of the parent state and a variant of the parent
//! action.
//!
//! # Example
//!
//! ```
//! use taskdeck_core::composition::scope;
//! use taskdeck_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     counter: CounterState,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Counter(CounterAction),
//!     Other,
//! }
//!
//! let scoped = scope(
//!     CounterReducer,
//!     |app: &mut AppState| &mut app.counter,
//!     |action: AppAction| match action {
//!         AppAction::Counter(inner) => Some(inner),
//!         AppAction::Other => None,
//!     },
//!     AppAction::Counter,
//!     |_env: &()| &(),
//! );
//!
//! let mut state = AppState::default();
//! scoped.reduce(&mut state, AppAction::Counter(CounterAction::Increment), &());
//! scoped.reduce(&mut state, AppAction::Other, &());
//! assert_eq!(state.counter.count, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Scopes a child reducer onto part of a parent's state, action and environment.
///
/// - `state`: borrows the child state out of the parent state
/// - `extract`: returns the child action carried by a parent action, if any
/// - `embed`: wraps child actions fed back by effects into parent actions
/// - `env`: borrows the child environment out of the parent environment
///
/// Parent actions that carry no child action are ignored (no effects).
pub fn scope<PS, PA, PE, R>(
    reducer: R,
    state: fn(&mut PS) -> &mut R::State,
    extract: fn(PA) -> Option<R::Action>,
    embed: fn(R::Action) -> PA,
    env: fn(&PE) -> &R::Environment,
) -> Scoped<PS, PA, PE, R>
where
    R: Reducer,
{
    Scoped {
        reducer,
        state,
        extract,
        embed,
        env,
    }
}

/// A child reducer embedded in a parent feature.
///
/// Created by [`scope`].
pub struct Scoped<PS, PA, PE, R>
where
    R: Reducer,
{
    reducer: R,
    state: fn(&mut PS) -> &mut R::State,
    extract: fn(PA) -> Option<R::Action>,
    embed: fn(R::Action) -> PA,
    env: fn(&PE) -> &R::Environment,
}

impl<PS, PA, PE, R> Scoped<PS, PA, PE, R>
where
    R: Reducer,
{
    /// Run the child reducer directly with a child action.
    ///
    /// Parents use this when they already hold a child action (for example,
    /// after validating an intent) and need the effects re-wrapped.
    pub fn run(
        &self,
        state: &mut PS,
        action: R::Action,
        env: &PE,
    ) -> SmallVec<[Effect<PA>; 4]>
    where
        R::Action: Send + 'static,
        PA: Send + 'static,
    {
        let effects = self
            .reducer
            .reduce((self.state)(state), action, (self.env)(env));

        effects
            .into_iter()
            .filter(|effect| !effect.is_none())
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}

impl<PS, PA, PE, R> Reducer for Scoped<PS, PA, PE, R>
where
    R: Reducer,
    R::Action: Send + 'static,
    PA: Send + 'static,
{
    type State = PS;
    type Action = PA;
    type Environment = PE;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match (self.extract)(action) {
            Some(child) => self.run(state, child, env),
            None => SmallVec::new(),
        }
    }
}
