//! Derived views of the todo list.

use crate::types::{Todo, TodoState};

/// Todos that pass the current filter and contain the search term
///
/// The search is a case-insensitive substring match; an empty term matches
/// everything. Insertion order is kept.
#[must_use]
pub fn filtered_todos(state: &TodoState) -> Vec<&Todo> {
    let term = state.search_term.to_lowercase();

    state
        .todos
        .iter()
        .filter(|todo| state.filter.matches(todo))
        .filter(|todo| term.is_empty() || todo.text.to_lowercase().contains(&term))
        .collect()
}

/// Summary counts for the stats panel
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TodoStats {
    /// Number of todos
    pub total: usize,
    /// Number of completed todos
    pub completed: usize,
    /// Number of open todos
    pub active: usize,
    /// Completed share as a percentage (0 when there are no todos)
    pub progress: f64,
}

impl TodoStats {
    /// `progress` rounded to a whole percentage
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // 0.0..=100.0
    pub fn rounded_progress(&self) -> u8 {
        self.progress.round().clamp(0.0, 100.0) as u8
    }
}

impl From<&[Todo]> for TodoStats {
    #[allow(clippy::cast_precision_loss)]
    fn from(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|todo| todo.completed).count();
        let progress = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };

        Self {
            total,
            completed,
            active: total - completed,
            progress,
        }
    }
}
