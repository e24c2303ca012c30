//! Domain types for the todo list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskdeck_macros::Persist;
use thiserror::Error;

/// Identifier of a todo item
///
/// Opaque to everything but the id generator. Serialized as a bare string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wrap an existing id
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

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub text: String,
    /// Whether it is done
    pub completed: bool,
    /// When it was added
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates an open todo
    #[must_use]
    pub const fn new(id: TodoId, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at,
        }
    }
}

/// Which todos the list view shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Everything
    #[default]
    All,
    /// Not yet completed
    Active,
    /// Completed only
    Completed,
}

impl Filter {
    /// Every filter mode, in display order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Whether `todo` passes this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }

    /// Lowercase name, as typed on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text that names no filter mode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter '{0}' (expected all, active or completed)")]
pub struct UnknownFilter(pub String);

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFilter(wanted.to_string()))
    }
}

/// State of the todo list
#[derive(Persist, Clone, Debug, Default, PartialEq, Eq)]
#[persist(key = "todo")]
pub struct TodoState {
    /// All todos, in insertion order
    #[persist]
    pub todos: Vec<Todo>,
    /// Current filter mode
    pub filter: Filter,
    /// Current search term (matched case-insensitively)
    pub search_term: String,
}

impl TodoState {
    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| &todo.id == id)
    }

    /// Returns a mutable todo by ID
    pub fn get_mut(&mut self, id: &TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| &todo.id == id)
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }
}

/// Everything that can happen to the todo list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Append a new open todo
    AddTodo {
        /// Text of the todo, stored verbatim
        text: String,
    },

    /// Flip a todo between open and completed
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
    },

    /// Replace a todo's text
    UpdateTodoItem {
        /// Todo to edit
        id: TodoId,
        /// New text, stored verbatim
        text: String,
    },

    /// Remove every completed todo
    ClearCompleted,

    /// Change the list filter
    SetFilter(Filter),

    /// Change the search term
    SetSearchTerm(String),
}
