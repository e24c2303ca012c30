//! Text rendering of the application state.

use crate::reducer::AppState;
use std::fmt;
use todo::{filtered_todos, Filter, TodoStats};

/// Full screen for one state
pub struct Screen<'a>(pub &'a AppState);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;

        writeln!(f, "Counter: {}", state.counter.value)?;
        writeln!(f)?;

        write!(f, "Todos [{}]", state.todo.filter)?;
        if !state.todo.search_term.is_empty() {
            write!(f, " matching \"{}\"", state.todo.search_term)?;
        }
        writeln!(f)?;

        let visible = filtered_todos(&state.todo);
        if visible.is_empty() {
            writeln!(f, "  {}", empty_message(state.todo.filter, state.todo.todos.is_empty()))?;
        }
        for todo in visible {
            let mark = if todo.completed { 'x' } else { ' ' };
            writeln!(f, "  [{mark}] {}  {}", todo.id, todo.text)?;
        }

        let stats = TodoStats::from(state.todo.todos.as_slice());
        writeln!(
            f,
            "{} total, {} active, {} completed ({}% done)",
            stats.total,
            stats.active,
            stats.completed,
            stats.rounded_progress()
        )?;

        if !state.notifications.is_empty() {
            writeln!(f)?;
            for entry in state.notifications.most_recent_first() {
                writeln!(
                    f,
                    "  ({}) {} {}: {}",
                    entry.id.0, entry.kind, entry.title, entry.message
                )?;
            }
        }

        if let Some(prompt) = state.clear_prompt() {
            writeln!(f)?;
            writeln!(f, "{prompt} [yes/no]")?;
        }

        Ok(())
    }
}

const fn empty_message(filter: Filter, no_todos: bool) -> &'static str {
    if no_todos {
        return "No todos yet. Add one with 'todo <text>'.";
    }
    match filter {
        Filter::All => "No todos match the search.",
        Filter::Active => "No active todos.",
        Filter::Completed => "No completed todos.",
    }
}

/// Render `state` as text
#[must_use]
pub fn render(state: &AppState) -> String {
    Screen(state).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifications::{Notification, NotificationId, NotificationKind};
    use std::time::Duration;
    use taskdeck_testing::test_clock;
    use taskdeck_core::environment::Clock;
    use todo::Todo;

    fn todo(id: &str, text: &str, completed: bool) -> Todo {
        let mut todo = Todo::new(id.into(), text.to_string(), test_clock().now());
        todo.completed = completed;
        todo
    }

    fn notification(id: u64, title: &str) -> Notification {
        Notification {
            id: NotificationId(id),
            kind: NotificationKind::Success,
            title: title.to_string(),
            message: "done".to_string(),
            duration: Duration::from_secs(4),
        }
    }

    #[test]
    fn empty_state() {
        let screen = render(&AppState::default());
        assert!(screen.starts_with("Counter: 0\n"));
        assert!(screen.contains("No todos yet."));
        assert!(screen.contains("0 total, 0 active, 0 completed (0% done)"));
    }

    #[test]
    fn filtered_list_and_stats() {
        let mut state = AppState::default();
        state.counter.value = 12;
        state.todo.todos = vec![todo("1", "Buy milk", true), todo("2", "Walk dog", false)];
        state.todo.filter = Filter::Completed;

        let screen = render(&state);
        assert!(screen.contains("Counter: 12"));
        assert!(screen.contains("Todos [completed]"));
        assert!(screen.contains("  [x] 1  Buy milk"));
        assert!(!screen.contains("Walk dog"));
        assert!(screen.contains("2 total, 1 active, 1 completed (50% done)"));
    }

    #[test]
    fn search_without_matches() {
        let mut state = AppState::default();
        state.todo.todos = vec![todo("1", "Buy milk", false)];
        state.todo.search_term = "bread".to_string();

        let screen = render(&state);
        assert!(screen.contains("Todos [all] matching \"bread\""));
        assert!(screen.contains("No todos match the search."));
    }

    #[test]
    fn notifications_newest_first_and_prompt() {
        let mut state = AppState::default();
        state.notifications.entries = vec![notification(1, "First"), notification(2, "Second")];
        state.todo.todos = vec![
            todo("1", "a", true),
            todo("2", "b", true),
            todo("3", "c", true),
        ];
        state.confirm_clear = true;

        let screen = render(&state);
        let first = screen.find("(1) success First").unwrap_or(usize::MAX);
        let second = screen.find("(2) success Second").unwrap_or(usize::MAX);
        assert!(second < first, "newest entry is listed first:\n{screen}");
        assert!(screen.contains("delete all 3 completed todos?"));
        assert!(screen.trim_end().ends_with("[yes/no]"));
    }
}
