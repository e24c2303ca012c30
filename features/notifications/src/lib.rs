//! # Notifications
//!
//! An insertion-ordered queue of transient messages.
//!
//! Every entry owns an expiry timer: adding an entry returns a cancellable
//! delayed effect keyed by the entry id, which feeds
//! [`NotificationAction::Expire`] back into the store when it fires.
//! Dismissing an entry early cancels that timer, so at most one live timer
//! exists per entry and no timer outlives its entry.
//!
//! ## Example
//!
//! ```no_run
//! use notifications::{
//!     NewNotification, NotificationAction, NotificationEnvironment, NotificationReducer,
//!     NotificationState,
//! };
//! use taskdeck_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new(
//!     NotificationState::default(),
//!     NotificationReducer::new(),
//!     NotificationEnvironment::default(),
//! );
//!
//! store
//!     .send(NotificationAction::Add(NewNotification::success(
//!         "Todo Added",
//!         "\"Buy milk\" has been added to your list",
//!     )))
//!     .await?;
//!
//! // Four seconds later the entry is gone again.
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;
use taskdeck_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec, timer, SmallVec,
};

/// Severity of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Something worked
    Success,
    /// Something failed
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

impl NotificationKind {
    /// Lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a queued notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

impl NotificationId {
    /// Id of the expiry timer belonging to this notification
    #[must_use]
    pub fn timer_id(self) -> EffectId {
        EffectId::new(format!("notification-{}", self.0))
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A queued notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Unique id within the queue
    pub id: NotificationId,
    /// Severity
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// How long the entry stays before expiring
    pub duration: Duration,
}

/// Request to enqueue a notification
///
/// Without an id the queue assigns the next free one; without a duration the
/// environment's default applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNotification {
    /// Explicit id (replaces an existing entry with the same id)
    pub id: Option<NotificationId>,
    /// Severity
    pub kind: NotificationKind,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Explicit lifetime
    pub duration: Option<Duration>,
}

impl NewNotification {
    /// Notification of the given kind with default id and duration
    #[must_use]
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            title: title.into(),
            message: message.into(),
            duration: None,
        }
    }

    /// Success notification
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, message)
    }

    /// Error notification
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    /// Warning notification
    #[must_use]
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title, message)
    }

    /// Info notification
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, message)
    }

    /// Use an explicit lifetime
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Use an explicit id
    #[must_use]
    pub const fn with_id(mut self, id: NotificationId) -> Self {
        self.id = Some(id);
        self
    }
}

/// The queue
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationState {
    /// Entries in insertion order (oldest first)
    pub entries: Vec<Notification>,
    /// Next id to assign
    pub next_id: u64,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl NotificationState {
    /// Entries newest first, for display
    pub fn most_recent_first(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().rev()
    }

    /// Entry by id
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Number of queued entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn allocate_id(&mut self, requested: Option<NotificationId>) -> NotificationId {
        match requested {
            Some(id) => {
                self.next_id = self.next_id.max(id.0.saturating_add(1));
                id
            },
            None => {
                let id = NotificationId(self.next_id);
                self.next_id = self.next_id.saturating_add(1);
                id
            },
        }
    }

    fn remove(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }
}

/// Everything that can happen to the queue
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationAction {
    /// Enqueue a notification and start its expiry timer
    Add(NewNotification),
    /// Remove an entry early (manual close)
    Dismiss(NotificationId),
    /// Expiry timer fired
    Expire(NotificationId),
    /// Remove every entry
    DismissAll,
}

/// Queue configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotificationEnvironment {
    /// Lifetime of entries added without an explicit duration
    pub default_duration: Duration,
    /// Maximum queue length; the oldest entries are evicted beyond it.
    /// `None` (or `Some(0)`) means unbounded.
    pub capacity: Option<usize>,
}

impl NotificationEnvironment {
    /// Default lifetime of an entry
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);

    /// Default maximum queue length
    pub const DEFAULT_CAPACITY: usize = 20;

    /// Environment with explicit settings
    #[must_use]
    pub const fn new(default_duration: Duration, capacity: Option<usize>) -> Self {
        Self {
            default_duration,
            capacity,
        }
    }
}

impl Default for NotificationEnvironment {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION, Some(Self::DEFAULT_CAPACITY))
    }
}

/// Reducer for the notification queue
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationReducer;

impl NotificationReducer {
    /// Create a new notification reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for NotificationReducer {
    type State = NotificationState;
    type Action = NotificationAction;
    type Environment = NotificationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NotificationAction::Add(new) => {
                let id = state.allocate_id(new.id);
                let duration = new
                    .duration
                    .filter(|d| !d.is_zero())
                    .unwrap_or(env.default_duration);

                // Same id: the new entry and its timer replace the old ones.
                if state.remove(id).is_some() {
                    tracing::debug!(%id, "Replacing notification");
                }

                tracing::debug!(%id, kind = %new.kind, title = %new.title, "Notification queued");
                state.entries.push(Notification {
                    id,
                    kind: new.kind,
                    title: new.title,
                    message: new.message,
                    duration,
                });

                let mut effects: SmallVec<[Effect<Self::Action>; 4]> = smallvec![timer! {
                    id: id.timer_id(),
                    after: duration,
                    action: NotificationAction::Expire(id)
                }];

                if let Some(capacity) = env.capacity.filter(|c| *c > 0) {
                    let overflow = state.entries.len().saturating_sub(capacity);
                    for evicted in state.entries.drain(..overflow) {
                        tracing::debug!(id = %evicted.id, "Queue full, evicting oldest notification");
                        effects.push(Effect::Cancel(evicted.id.timer_id()));
                    }
                }

                effects
            },
            NotificationAction::Dismiss(id) => match state.remove(id) {
                Some(_) => smallvec![Effect::Cancel(id.timer_id())],
                None => smallvec![Effect::None],
            },
            NotificationAction::Expire(id) => {
                if state.remove(id).is_some() {
                    tracing::trace!(%id, "Notification expired");
                }
                smallvec![Effect::None]
            },
            NotificationAction::DismissAll => state
                .entries
                .drain(..)
                .map(|entry| Effect::Cancel(entry.id.timer_id()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_testing::{assertions, ReducerTest};

    fn env() -> NotificationEnvironment {
        NotificationEnvironment::new(Duration::from_millis(4000), Some(3))
    }

    fn queue(ids: &[u64]) -> NotificationState {
        let mut state = NotificationState::default();
        for id in ids {
            NotificationReducer.reduce(
                &mut state,
                NotificationAction::Add(
                    NewNotification::info("t", format!("m{id}")).with_id(NotificationId(*id)),
                ),
                &env(),
            );
        }
        state
    }

    fn ids(state: &NotificationState) -> Vec<u64> {
        state.entries.iter().map(|entry| entry.id.0).collect()
    }

    #[test]
    fn add_assigns_ids_and_starts_timer() {
        ReducerTest::new(NotificationReducer::new())
            .with_env(env())
            .given_state(NotificationState::default())
            .when_action(NotificationAction::Add(NewNotification::success(
                "Todo Added",
                "\"Buy milk\" has been added to your list",
            )))
            .then_state(|state| {
                assert_eq!(state.len(), 1);
                let entry = &state.entries[0];
                assert_eq!(entry.id, NotificationId(1));
                assert_eq!(entry.kind, NotificationKind::Success);
                assert_eq!(entry.duration, Duration::from_millis(4000));
                assert_eq!(state.next_id, 2);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .then_timer(EffectId::new("notification-1"), Duration::from_millis(4000))
            .then_delayed(|delayed| {
                assert_eq!(
                    delayed,
                    [(Duration::from_millis(4000), &NotificationAction::Expire(NotificationId(1)))]
                );
            })
            .run();
    }

    #[test]
    fn explicit_duration_wins_and_zero_falls_back() {
        let mut state = NotificationState::default();
        let effects = NotificationReducer.reduce(
            &mut state,
            NotificationAction::Add(
                NewNotification::warning("w", "m").with_duration(Duration::from_millis(250)),
            ),
            &env(),
        );
        assert_eq!(assertions::delayed_actions(&effects)[0].0, Duration::from_millis(250));

        NotificationReducer.reduce(
            &mut state,
            NotificationAction::Add(NewNotification::error("e", "m").with_duration(Duration::ZERO)),
            &env(),
        );
        assert_eq!(state.entries[1].duration, Duration::from_millis(4000));
    }

    #[test]
    fn explicit_id_replaces_existing_entry() {
        let mut state = queue(&[5]);
        NotificationReducer.reduce(
            &mut state,
            NotificationAction::Add(NewNotification::error("new", "m").with_id(NotificationId(5))),
            &env(),
        );

        assert_eq!(state.len(), 1);
        assert_eq!(state.entries[0].title, "new");
        assert_eq!(state.next_id, 6, "auto ids stay above explicit ones");
    }

    #[test]
    fn dismiss_removes_and_cancels_timer() {
        ReducerTest::new(NotificationReducer::new())
            .with_env(env())
            .given_state(queue(&[1, 2]))
            .when_action(NotificationAction::Dismiss(NotificationId(1)))
            .then_state(|state| assert_eq!(ids(state), [2]))
            .then_cancelled(EffectId::new("notification-1"))
            .run();
    }

    #[test]
    fn dismissing_unknown_id_is_a_no_op() {
        ReducerTest::new(NotificationReducer::new())
            .with_env(env())
            .given_state(queue(&[1]))
            .when_action(NotificationAction::Dismiss(NotificationId(9)))
            .then_state(|state| assert_eq!(ids(state), [1]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn expire_is_idempotent() {
        let mut state = queue(&[1, 2]);
        for _ in 0..2 {
            let effects =
                NotificationReducer.reduce(&mut state, NotificationAction::Expire(NotificationId(1)), &env());
            assertions::assert_no_cancel(&effects);
        }
        assert_eq!(ids(&state), [2]);
    }

    #[test]
    fn capacity_evicts_oldest_and_cancels_their_timers() {
        ReducerTest::new(NotificationReducer::new())
            .with_env(env())
            .given_state(queue(&[1, 2, 3]))
            .when_action(NotificationAction::Add(NewNotification::info("t", "m")))
            .then_state(|state| assert_eq!(ids(state), [2, 3, 4]))
            .then_effects(|effects| {
                assertions::assert_has_cancellable(effects, &EffectId::new("notification-4"));
                assertions::assert_has_cancel(effects, &EffectId::new("notification-1"));
            })
            .run();
    }

    #[test]
    fn unbounded_queue_never_evicts() {
        let env = NotificationEnvironment::new(Duration::from_secs(1), Some(0));
        let mut state = NotificationState::default();
        for _ in 0..50 {
            NotificationReducer.reduce(
                &mut state,
                NotificationAction::Add(NewNotification::info("t", "m")),
                &env,
            );
        }
        assert_eq!(state.len(), 50);
    }

    #[test]
    fn dismiss_all_cancels_every_timer() {
        let mut state = queue(&[1, 2, 3]);
        let effects = NotificationReducer.reduce(&mut state, NotificationAction::DismissAll, &env());

        assert!(state.is_empty());
        assertions::assert_effects_count(&effects, 3);
        for id in 1..=3 {
            assertions::assert_has_cancel(&effects, &NotificationId(id).timer_id());
        }
    }

    #[test]
    fn display_order_is_newest_first() {
        let state = queue(&[1, 2, 3]);
        let order: Vec<_> = state.most_recent_first().map(|e| e.id.0).collect();
        assert_eq!(order, [3, 2, 1]);
    }
}
