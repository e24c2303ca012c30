//! Reducer logic for the todo list.

use crate::types::{Todo, TodoAction, TodoId, TodoState};
use std::sync::Arc;
use taskdeck_core::{
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    smallvec, SmallVec,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for creation timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of fresh todo ids
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn with_todo(state: &mut TodoState, id: &TodoId, f: impl FnOnce(&mut Todo)) {
        match state.get_mut(id) {
            Some(todo) => f(todo),
            None => tracing::trace!(%id, "No todo with this id, ignoring"),
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::AddTodo { text } => {
                let id = TodoId::new(env.ids.next_id());
                tracing::debug!(%id, "Adding todo");
                state.todos.push(Todo::new(id, text, env.clock.now()));
            },
            TodoAction::ToggleTodo { id } => {
                Self::with_todo(state, &id, |todo| todo.completed = !todo.completed);
            },
            TodoAction::DeleteTodo { id } => {
                state.todos.retain(|todo| todo.id != id);
            },
            TodoAction::UpdateTodoItem { id, text } => {
                Self::with_todo(state, &id, |todo| todo.text = text);
            },
            TodoAction::ClearCompleted => {
                state.todos.retain(|todo| !todo.completed);
            },
            TodoAction::SetFilter(filter) => {
                state.filter = filter;
            },
            TodoAction::SetSearchTerm(term) => {
                state.search_term = term;
            },
        }

        smallvec![Effect::None]
    }
}
