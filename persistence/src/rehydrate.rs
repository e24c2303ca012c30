use taskdeck_core::persist::{Persist, PersistError, Storage};

/// Outcome of restoring one slice at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rehydration {
    /// The stored record was merged into the slice
    Restored,
    /// Nothing was stored under the slice's key
    Missing,
    /// The record could not be read or applied; defaults were kept
    Failed(String),
}

impl Rehydration {
    /// Whether stored data was applied
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

/// Restore `slice` from the record stored under `T::KEY`
///
/// Never fails: an unreadable, unparsable or mis-shaped record is logged and
/// the slice keeps its defaults. Call before the first render.
#[tracing::instrument(skip_all, fields(key = T::KEY))]
pub async fn rehydrate<T, S>(storage: &S, slice: &mut T) -> Rehydration
where
    T: Persist,
    S: Storage,
{
    match try_rehydrate(storage, slice).await {
        Ok(true) => {
            tracing::info!("Rehydrated persisted state");
            Rehydration::Restored
        },
        Ok(false) => {
            tracing::debug!("No persisted state, using defaults");
            Rehydration::Missing
        },
        Err(error) => {
            tracing::warn!(%error, "Could not rehydrate persisted state, using defaults");
            metrics::counter!("persistence.rehydrate.failed").increment(1);
            Rehydration::Failed(error.to_string())
        },
    }
}

async fn try_rehydrate<T, S>(storage: &S, slice: &mut T) -> Result<bool, PersistError>
where
    T: Persist,
    S: Storage,
{
    let Some(bytes) = storage.load(T::KEY).await? else {
        return Ok(false);
    };

    let value = serde_json::from_slice(&bytes)?;
    slice.restore(value)?;
    Ok(true)
}
