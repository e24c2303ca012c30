//! Mirrors whitelisted state slices to storage.
//!
//! The store calls [`PersistenceObserver::record`] synchronously after every
//! transition. Recording only snapshots the registered slices and compares
//! them with what was last handed to storage; changed slices are queued to a
//! single writer task, so writes happen in transition order and dispatch never
//! waits on I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use serde_json::Value;
use taskdeck_core::persist::{Persist, Result, Storage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type Snapshotter<S> = Box<dyn Fn(&S) -> Result<Value> + Send + Sync>;

struct Slice<S> {
    key: &'static str,
    snapshot: Snapshotter<S>,
}

struct Write {
    key: &'static str,
    bytes: Vec<u8>,
}

/// What the writer task did before it stopped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterReport {
    /// Records written successfully
    pub written: usize,
    /// Writes that failed (logged, not retried)
    pub failed: usize,
}

/// Registers the slices of `S` to persist
pub struct PersistenceBuilder<S> {
    slices: Vec<Slice<S>>,
}

impl<S: 'static> PersistenceBuilder<S> {
    /// Persist the slice selected by `project`
    ///
    /// ```ignore
    /// builder.slice(|s: &AppState| &s.todo)
    /// ```
    #[must_use]
    pub fn slice<T>(mut self, project: fn(&S) -> &T) -> Self
    where
        T: Persist + 'static,
    {
        self.slices.push(Slice {
            key: T::KEY,
            snapshot: Box::new(move |state| project(state).snapshot()),
        });
        self
    }

    /// Start the writer task on the current tokio runtime
    #[must_use]
    pub fn spawn<St>(self, storage: St) -> PersistenceObserver<S>
    where
        St: Storage + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(storage, receiver));

        PersistenceObserver {
            slices: self.slices,
            last_written: Mutex::new(HashMap::new()),
            sender: Mutex::new(Some(sender)),
            writer: Mutex::new(Some(writer)),
        }
    }
}

/// Store observer that persists registered slices after each transition.
///
/// Build with [`PersistenceObserver::builder`].
pub struct PersistenceObserver<S> {
    slices: Vec<Slice<S>>,
    last_written: Mutex<HashMap<&'static str, Value>>,
    sender: Mutex<Option<mpsc::UnboundedSender<Write>>>,
    writer: Mutex<Option<JoinHandle<WriterReport>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: 'static> PersistenceObserver<S> {
    /// Start registering slices
    #[must_use]
    pub const fn builder() -> PersistenceBuilder<S> {
        PersistenceBuilder { slices: Vec::new() }
    }

    /// Treat the current snapshots of `state` as already stored
    ///
    /// Call once after rehydration so the first transition does not rewrite
    /// slices it did not touch.
    pub fn prime(&self, state: &S) {
        let mut last_written = lock(&self.last_written);
        for slice in &self.slices {
            if let Ok(value) = (slice.snapshot)(state) {
                last_written.insert(slice.key, value);
            }
        }
    }

    /// Queue a write for every registered slice whose snapshot changed
    pub fn record(&self, state: &S) {
        for slice in &self.slices {
            let value = match (slice.snapshot)(state) {
                Ok(value) => value,
                Err(error) => {
                    tracing::warn!(key = slice.key, %error, "Could not snapshot state");
                    continue;
                },
            };

            let bytes = {
                let mut last_written = lock(&self.last_written);
                if last_written.get(slice.key) == Some(&value) {
                    continue;
                }
                let bytes = match serde_json::to_vec(&value) {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        tracing::warn!(key = slice.key, %error, "Could not encode snapshot");
                        continue;
                    },
                };
                last_written.insert(slice.key, value);
                bytes
            };

            self.enqueue(Write {
                key: slice.key,
                bytes,
            });
        }
    }

    fn enqueue(&self, write: Write) {
        let key = write.key;
        let sent = lock(&self.sender)
            .as_ref()
            .is_some_and(|sender| sender.send(write).is_ok());

        if !sent {
            tracing::debug!(key, "Persistence writer stopped, dropping write");
        }
    }

    /// Stop accepting writes and wait for queued ones to finish
    ///
    /// Later calls (and writes recorded afterwards) are no-ops.
    pub async fn shutdown(&self) -> WriterReport {
        drop(lock(&self.sender).take());

        let writer = lock(&self.writer).take();
        match writer {
            Some(writer) => match writer.await {
                Ok(report) => report,
                Err(error) => {
                    tracing::error!(%error, "Persistence writer task failed");
                    WriterReport::default()
                },
            },
            None => WriterReport::default(),
        }
    }
}

impl<S> std::fmt::Debug for PersistenceObserver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceObserver")
            .field("slices", &self.slices.iter().map(|s| s.key).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

async fn write_loop<St: Storage>(
    storage: St,
    mut receiver: mpsc::UnboundedReceiver<Write>,
) -> WriterReport {
    let mut report = WriterReport::default();

    while let Some(write) = receiver.recv().await {
        match storage.save(write.key, &write.bytes).await {
            Ok(()) => {
                tracing::debug!(key = write.key, bytes = write.bytes.len(), "Persisted state");
                metrics::counter!("persistence.writes", "result" => "ok").increment(1);
                report.written += 1;
            },
            Err(error) => {
                tracing::warn!(key = write.key, %error, "Failed to persist state");
                metrics::counter!("persistence.writes", "result" => "error").increment(1);
                report.failed += 1;
            },
        }
    }

    report
}
