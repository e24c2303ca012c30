//! Line commands of the terminal front end.

use crate::reducer::AppAction;
use counter::CounterAction;
use notifications::{NotificationAction, NotificationId};
use thiserror::Error;
use todo::{Filter, TodoAction, UnknownFilter};

/// Help text printed by `help`
pub const HELP: &str = "\
Commands:
  inc | dec | reset        change the counter
  add <n>                  add n to the counter (invalid input adds 0)
  todo <text>              add a todo
  toggle <id>              mark a todo complete or incomplete
  edit <id> <text>         change a todo's text
  rm <id>                  delete a todo
  filter all|active|completed
  search [term]            filter todos by text (empty clears)
  clear                    delete completed todos (asks first)
  yes | no                 answer the confirmation
  dismiss <n>              close a notification
  dismiss-all              close every notification
  help | quit";

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send an action to the store
    Dispatch(AppAction),
    /// Print the command list
    Help,
    /// Leave the session
    Quit,
}

/// Why a line could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The first word is not a command
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    /// A required argument is missing
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        /// Command as typed
        command: &'static str,
        /// What is missing
        argument: &'static str,
    },

    /// `dismiss` with something other than a notification number
    #[error("'{0}' is not a notification number")]
    InvalidNotificationId(String),

    /// `filter` with an unknown mode
    #[error(transparent)]
    Filter(#[from] UnknownFilter),
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown commands or malformed arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word {
            "inc" => dispatch(AppAction::Counter(CounterAction::Increment)),
            "dec" => dispatch(AppAction::Counter(CounterAction::Decrement)),
            "reset" => dispatch(AppAction::Counter(CounterAction::Reset)),
            "add" => dispatch(AppAction::Counter(CounterAction::increment_by_text(rest))),
            "todo" => dispatch(AppAction::SubmitTodo {
                text: rest.to_string(),
            }),
            "toggle" => dispatch(AppAction::ToggleTodo {
                id: required("toggle", "a todo id", rest)?.into(),
            }),
            "rm" => dispatch(AppAction::DeleteTodo {
                id: required("rm", "a todo id", rest)?.into(),
            }),
            "edit" => {
                let rest = required("edit", "a todo id and text", rest)?;
                let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                dispatch(AppAction::SaveEdit {
                    id: id.into(),
                    text: text.to_string(),
                })
            },
            "filter" => {
                let filter: Filter = required("filter", "all, active or completed", rest)?.parse()?;
                dispatch(AppAction::Todo(TodoAction::SetFilter(filter)))
            },
            "search" => dispatch(AppAction::Todo(TodoAction::SetSearchTerm(rest.to_string()))),
            "clear" => dispatch(AppAction::RequestClearCompleted),
            "yes" | "y" => dispatch(AppAction::ConfirmClearCompleted),
            "no" | "n" => dispatch(AppAction::CancelClearCompleted),
            "dismiss" => {
                let raw = required("dismiss", "a notification number", rest)?;
                let id = raw
                    .parse::<u64>()
                    .map_err(|_| CommandError::InvalidNotificationId(raw.to_string()))?;
                dispatch(AppAction::Notifications(NotificationAction::Dismiss(
                    NotificationId(id),
                )))
            },
            "dismiss-all" => dispatch(AppAction::Notifications(NotificationAction::DismissAll)),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

const fn dispatch(action: AppAction) -> Command {
    Command::Dispatch(action)
}

fn required<'a>(
    command: &'static str,
    argument: &'static str,
    rest: &'a str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can unwrap and panic
mod tests {
    use super::*;

    fn action(line: &str) -> AppAction {
        match Command::parse(line).unwrap() {
            Some(Command::Dispatch(action)) => action,
            other => panic!("expected a dispatch for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn counter_commands() {
        assert_eq!(action("inc"), AppAction::Counter(CounterAction::Increment));
        assert_eq!(action(" dec "), AppAction::Counter(CounterAction::Decrement));
        assert_eq!(action("reset"), AppAction::Counter(CounterAction::Reset));
        assert_eq!(
            action("add -15"),
            AppAction::Counter(CounterAction::IncrementByAmount(-15))
        );
        assert_eq!(
            action("add lots"),
            AppAction::Counter(CounterAction::IncrementByAmount(0))
        );
        assert_eq!(action("add"), AppAction::Counter(CounterAction::IncrementByAmount(0)));
    }

    #[test]
    fn todo_text_keeps_inner_spacing() {
        assert_eq!(
            action("todo  Buy  milk "),
            AppAction::SubmitTodo {
                text: "Buy  milk".to_string()
            }
        );
    }

    #[test]
    fn edit_splits_id_from_text() {
        assert_eq!(
            action("edit 42 walk the dog"),
            AppAction::SaveEdit {
                id: "42".into(),
                text: "walk the dog".to_string()
            }
        );
        assert_eq!(
            action("edit 42"),
            AppAction::SaveEdit {
                id: "42".into(),
                text: String::new()
            }
        );
    }

    #[test]
    fn filter_and_search() {
        assert_eq!(
            action("filter active"),
            AppAction::Todo(TodoAction::SetFilter(Filter::Active))
        );
        assert_eq!(
            action("search"),
            AppAction::Todo(TodoAction::SetSearchTerm(String::new()))
        );
        assert!(matches!(
            Command::parse("filter done"),
            Err(CommandError::Filter(UnknownFilter(mode))) if mode == "done"
        ));
    }

    #[test]
    fn confirmation_and_notifications() {
        assert_eq!(action("clear"), AppAction::RequestClearCompleted);
        assert_eq!(action("yes"), AppAction::ConfirmClearCompleted);
        assert_eq!(action("no"), AppAction::CancelClearCompleted);
        assert_eq!(
            action("dismiss 3"),
            AppAction::Notifications(NotificationAction::Dismiss(NotificationId(3)))
        );
        assert_eq!(
            action("dismiss-all"),
            AppAction::Notifications(NotificationAction::DismissAll)
        );
    }

    #[test]
    fn errors() {
        assert_eq!(
            Command::parse("launch"),
            Err(CommandError::Unknown("launch".to_string()))
        );
        assert_eq!(
            Command::parse("toggle").unwrap_err().to_string(),
            "'toggle' needs a todo id"
        );
        assert_eq!(
            Command::parse("dismiss x"),
            Err(CommandError::InvalidNotificationId("x".to_string()))
        );
    }

    #[test]
    fn session_commands() {
        assert_eq!(Command::parse("help").unwrap(), Some(Command::Help));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
    }
}
