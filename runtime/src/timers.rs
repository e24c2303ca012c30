//! Registry of in-flight cancellable effects.
//!
//! Every [`Effect::Cancellable`](taskdeck_core::effect::Effect::Cancellable)
//! runs on its own task. The registry maps the effect id to that task's abort
//! handle so that a later `Effect::Cancel` (for example a manual dismissal of a
//! notification) stops the timer before it fires.
//!
//! Each registration carries a token. A task that finishes on its own only
//! deregisters if its token is still the current one, so a newer effect
//! registered under the same id is never dropped by an older one finishing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taskdeck_core::effect::EffectId;
use tokio::task::AbortHandle;

struct Registration {
    token: u64,
    handle: AbortHandle,
}

/// Shared registry of cancellable tasks, keyed by [`EffectId`].
#[derive(Clone, Default)]
pub struct Timers {
    entries: Arc<Mutex<HashMap<EffectId, Registration>>>,
    tokens: Arc<AtomicU64>,
}

impl Timers {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EffectId, Registration>> {
        // The map holds no invariants a panicking holder could break.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve a token for a registration that is about to be made
    pub fn next_token(&self) -> u64 {
        self.tokens.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a running task under `id`, aborting any task already there
    ///
    /// Returns `true` if an older task was replaced.
    pub fn register(&self, id: EffectId, token: u64, handle: AbortHandle) -> bool {
        let previous = self.lock().insert(id.clone(), Registration { token, handle });

        match previous {
            Some(old) => {
                old.handle.abort();
                tracing::debug!(effect_id = %id, "Replaced in-flight cancellable effect");
                true
            },
            None => false,
        }
    }

    /// Deregister after the task under `id` finished on its own
    pub fn complete(&self, id: &EffectId, token: u64) {
        let mut entries = self.lock();
        if entries.get(id).is_some_and(|r| r.token == token) {
            entries.remove(id);
        }
    }

    /// Abort the task registered under `id`
    ///
    /// Returns `true` if a task was registered; cancelling an unknown id is a no-op.
    pub fn cancel(&self, id: &EffectId) -> bool {
        let removed = self.lock().remove(id);

        match removed {
            Some(registration) => {
                registration.handle.abort();
                tracing::debug!(effect_id = %id, "Cancelled effect");
                metrics::counter!("store.effects.cancelled").increment(1);
                true
            },
            None => {
                tracing::trace!(effect_id = %id, "Cancel requested for unknown effect");
                false
            },
        }
    }

    /// Abort every registered task
    ///
    /// Returns the number of tasks aborted.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, registration) in &drained {
            registration.handle.abort();
        }
        drained.len()
    }

    /// Whether a task is registered under `id`
    #[must_use]
    pub fn is_pending(&self, id: &EffectId) -> bool {
        self.lock().contains_key(id)
    }

    /// Number of registered tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no tasks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}
