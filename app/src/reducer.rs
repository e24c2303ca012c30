//! The application reducer.
//!
//! Composes the counter, todo and notification engines and adds the intent
//! layer the front end dispatches to: text validation, user-facing
//! notifications, milestone announcements and the clear-completed
//! confirmation step.

use crate::milestone::MilestoneTracker;
use counter::{CounterAction, CounterEnvironment, CounterReducer, CounterState};
use notifications::{
    NewNotification, NotificationAction, NotificationEnvironment, NotificationReducer,
    NotificationState,
};
use std::sync::Arc;
use taskdeck_core::{
    composition::{scope, Scoped},
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    SmallVec,
};
use todo::{TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState};

/// Question asked before deleting `count` completed todos
#[must_use]
pub fn clear_prompt(count: usize) -> String {
    format!(
        "Are you sure you want to delete all {count} completed todo{}? This action cannot be undone.",
        plural(count)
    )
}

/// Whole-application state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Counter engine
    pub counter: CounterState,
    /// Todo engine
    pub todo: TodoState,
    /// Notification queue
    pub notifications: NotificationState,
    /// Milestones announced this session
    pub milestones: MilestoneTracker,
    /// Whether the "clear completed" confirmation is open
    pub confirm_clear: bool,
}

impl AppState {
    /// The open confirmation prompt, counting the todos a confirm would delete now
    #[must_use]
    pub fn clear_prompt(&self) -> Option<String> {
        self.confirm_clear
            .then(|| clear_prompt(self.todo.completed_count()))
    }
}

/// Everything the front end (and effects) can dispatch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Raw counter action
    Counter(CounterAction),
    /// Raw todo action (no validation, no notification)
    Todo(TodoAction),
    /// Notification queue action (timers feed `Expire` back through here)
    Notifications(NotificationAction),

    /// Add a todo from user input
    SubmitTodo {
        /// Text as typed
        text: String,
    },
    /// Toggle a todo and report it
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },
    /// Delete a todo and report it
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
    },
    /// Save an edited todo text from user input
    SaveEdit {
        /// Todo being edited
        id: TodoId,
        /// Text as typed
        text: String,
    },

    /// Ask for confirmation before clearing completed todos
    RequestClearCompleted,
    /// Confirm the pending clear
    ConfirmClearCompleted,
    /// Close the confirmation without clearing
    CancelClearCompleted,
}

/// Injected dependencies of every engine
#[derive(Clone, Debug)]
pub struct AppEnvironment {
    /// Counter environment
    pub counter: CounterEnvironment,
    /// Todo environment (clock, ids)
    pub todo: TodoEnvironment,
    /// Notification queue settings
    pub notifications: NotificationEnvironment,
}

impl AppEnvironment {
    /// Environment from its parts
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        notifications: NotificationEnvironment,
    ) -> Self {
        Self {
            counter: CounterEnvironment,
            todo: TodoEnvironment::new(clock, ids),
            notifications,
        }
    }
}

type Child<R> = Scoped<AppState, AppAction, AppEnvironment, R>;
type Effects = SmallVec<[Effect<AppAction>; 4]>;

/// Reducer for the whole application
pub struct AppReducer {
    counter: Child<CounterReducer>,
    todo: Child<TodoReducer>,
    notifications: Child<NotificationReducer>,
}

impl AppReducer {
    /// Wire the feature reducers into the application
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: scope(
                CounterReducer::new(),
                |s: &mut AppState| &mut s.counter,
                |a: AppAction| match a {
                    AppAction::Counter(action) => Some(action),
                    _ => None,
                },
                AppAction::Counter,
                |e: &AppEnvironment| &e.counter,
            ),
            todo: scope(
                TodoReducer::new(),
                |s: &mut AppState| &mut s.todo,
                |a: AppAction| match a {
                    AppAction::Todo(action) => Some(action),
                    _ => None,
                },
                AppAction::Todo,
                |e: &AppEnvironment| &e.todo,
            ),
            notifications: scope(
                NotificationReducer::new(),
                |s: &mut AppState| &mut s.notifications,
                |a: AppAction| match a {
                    AppAction::Notifications(action) => Some(action),
                    _ => None,
                },
                AppAction::Notifications,
                |e: &AppEnvironment| &e.notifications,
            ),
        }
    }

    fn notify(&self, state: &mut AppState, env: &AppEnvironment, new: NewNotification) -> Effects {
        self.notifications
            .run(state, NotificationAction::Add(new), env)
    }

    fn count(&self, state: &mut AppState, action: CounterAction, env: &AppEnvironment) -> Effects {
        let previous = state.counter.value;
        let mut effects = self.counter.run(state, action, env);

        if let Some(milestone) = state.milestones.observe(previous, state.counter.value) {
            tracing::info!(milestone, "Counter milestone reached");
            effects.extend(self.notify(
                state,
                env,
                NewNotification::success(
                    "Milestone Reached!",
                    format!("The counter reached {milestone}!"),
                ),
            ));
        }

        effects
    }

    fn submit_todo(&self, state: &mut AppState, text: &str, env: &AppEnvironment) -> Effects {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty todo");
            return Effects::new();
        }

        let mut effects = self.todo.run(
            state,
            TodoAction::AddTodo {
                text: text.to_string(),
            },
            env,
        );
        effects.extend(self.notify(
            state,
            env,
            NewNotification::success("Todo Added", format!("\"{text}\" has been added to your list")),
        ));
        effects
    }

    fn toggle_todo(&self, state: &mut AppState, id: TodoId, env: &AppEnvironment) -> Effects {
        let Some((was_completed, text)) = state
            .todo
            .get(&id)
            .map(|todo| (todo.completed, todo.text.clone()))
        else {
            return Effects::new();
        };

        let mut effects = self.todo.run(state, TodoAction::ToggleTodo { id }, env);
        let notification = if was_completed {
            NewNotification::success("Todo Uncompleted", format!("\"{text}\" marked as incomplete"))
        } else {
            NewNotification::success("Todo Completed", format!("\"{text}\" marked as complete"))
        };
        effects.extend(self.notify(state, env, notification));
        effects
    }

    fn delete_todo(&self, state: &mut AppState, id: TodoId, env: &AppEnvironment) -> Effects {
        let Some(text) = state.todo.get(&id).map(|todo| todo.text.clone()) else {
            return Effects::new();
        };

        let mut effects = self.todo.run(state, TodoAction::DeleteTodo { id }, env);
        effects.extend(self.notify(
            state,
            env,
            NewNotification::success("Todo Deleted", format!("\"{text}\" has been deleted")),
        ));
        effects
    }

    fn save_edit(&self, state: &mut AppState, id: TodoId, text: &str, env: &AppEnvironment) -> Effects {
        let text = text.trim();
        if text.is_empty() || state.todo.get(&id).is_none() {
            tracing::debug!(%id, "Ignoring edit");
            return Effects::new();
        }

        let mut effects = self.todo.run(
            state,
            TodoAction::UpdateTodoItem {
                id,
                text: text.to_string(),
            },
            env,
        );
        effects.extend(self.notify(
            state,
            env,
            NewNotification::success("Todo Updated", format!("\"{text}\" has been updated")),
        ));
        effects
    }

    fn confirm_clear(&self, state: &mut AppState, env: &AppEnvironment) -> Effects {
        if !std::mem::take(&mut state.confirm_clear) {
            return Effects::new();
        }

        let cleared = state.todo.completed_count();
        let mut effects = self.todo.run(state, TodoAction::ClearCompleted, env);
        if cleared > 0 {
            effects.extend(self.notify(
                state,
                env,
                NewNotification::success(
                    "Completed Todos Cleared",
                    format!("{cleared} completed todo{} deleted", plural(cleared)),
                ),
            ));
        }
        effects
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(?action, "Dispatch");

        let effects = match action {
            AppAction::Counter(action) => self.count(state, action, env),
            AppAction::Todo(action) => self.todo.run(state, action, env),
            AppAction::Notifications(action) => self.notifications.run(state, action, env),
            AppAction::SubmitTodo { text } => self.submit_todo(state, &text, env),
            AppAction::ToggleTodo { id } => self.toggle_todo(state, id, env),
            AppAction::DeleteTodo { id } => self.delete_todo(state, id, env),
            AppAction::SaveEdit { id, text } => self.save_edit(state, id, &text, env),
            AppAction::RequestClearCompleted => {
                let count = state.todo.completed_count();
                if count == 0 {
                    tracing::debug!("Nothing to clear");
                } else {
                    state.confirm_clear = true;
                }
                Effects::new()
            },
            AppAction::ConfirmClearCompleted => self.confirm_clear(state, env),
            AppAction::CancelClearCompleted => {
                state.confirm_clear = false;
                Effects::new()
            },
        };

        // Nothing left to delete: the question no longer applies.
        if state.confirm_clear && state.todo.completed_count() == 0 {
            state.confirm_clear = false;
        }

        effects
    }
}

const fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
