//! Application root: owns the store and the persistence writer.

use crate::config::AppConfig;
use crate::reducer::{AppAction, AppEnvironment, AppReducer, AppState};
use std::sync::Arc;
use std::time::Duration;
use taskdeck_core::environment::{Clock, IdGenerator};
use taskdeck_core::persist::Storage;
use taskdeck_persistence::{rehydrate, PersistenceObserver, WriterReport};
use taskdeck_runtime::{Store, StoreError};

/// The application store
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;

/// A running application
///
/// Rehydrates persisted slices, builds the store and keeps storage in sync
/// with every transition until [`Session::shutdown`].
pub struct Session {
    store: AppStore,
    persistence: Arc<PersistenceObserver<AppState>>,
    shutdown_timeout: Duration,
}

impl Session {
    /// Restore persisted state and start the store
    ///
    /// Missing or unreadable records leave the affected slice at its
    /// defaults; the failure is logged and the session starts anyway.
    #[tracing::instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
    pub async fn start<St>(
        config: &AppConfig,
        storage: St,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self
    where
        St: Storage + 'static,
    {
        let mut state = AppState::default();
        rehydrate(&storage, &mut state.todo).await;
        rehydrate(&storage, &mut state.counter).await;

        for todo in &state.todo.todos {
            ids.observe(todo.id.as_str());
        }

        tracing::info!(
            todos = state.todo.todos.len(),
            counter = state.counter.value,
            "Session started"
        );

        let persistence = Arc::new(
            PersistenceObserver::builder()
                .slice(|s: &AppState| &s.todo)
                .slice(|s: &AppState| &s.counter)
                .spawn(storage),
        );
        persistence.prime(&state);

        let environment = AppEnvironment::new(clock, ids, config.notification_environment());
        let store = Store::new(state, AppReducer::new(), environment);

        let observer = Arc::clone(&persistence);
        store.observe(move |state| observer.record(state));

        Self {
            store,
            persistence,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// The store; clone it to dispatch from other tasks
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Stop the store, then flush queued writes
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects were still running
    /// after the configured timeout. Queued writes are flushed either way.
    pub async fn shutdown(self) -> Result<WriterReport, StoreError> {
        let stopped = self.store.shutdown(self.shutdown_timeout).await;

        let report = self.persistence.shutdown().await;
        tracing::info!(
            written = report.written,
            failed = report.failed,
            "Persistence writer stopped"
        );

        stopped.map(|()| report)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("persistence", &self.persistence)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish_non_exhaustive()
    }
}
