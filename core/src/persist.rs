//! Whitelisted persistence of state slices.
//!
//! A state slice that should survive restarts implements [`Persist`]: it names
//! a storage namespace and converts only its whitelisted fields to and from
//! JSON. Transient view fields (filters, search terms) never reach storage and
//! always start from their defaults.
//!
//! Storage backends implement [`Storage`], an async key-value interface keyed
//! by namespace.
//!
//! # Example
//!
//! ```
//! use taskdeck_core::persist::{Persist, PersistError};
//! use taskdeck_core::serde_json::{json, Value};
//!
//! #[derive(Default)]
//! struct Volume {
//!     level: u8,
//!     muted_preview: bool,
//! }
//!
//! impl Persist for Volume {
//!     const KEY: &'static str = "volume";
//!
//!     fn snapshot(&self) -> Result<Value, PersistError> {
//!         Ok(json!({ "level": self.level }))
//!     }
//!
//!     fn restore(&mut self, value: Value) -> Result<(), PersistError> {
//!         if let Some(level) = value.get("level").and_then(Value::as_u64) {
//!             self.level = u8::try_from(level)
//!                 .map_err(|e| PersistError::Serialization(e.to_string()))?;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut volume = Volume::default();
//! volume.restore(json!({ "level": 7, "muted_preview": true })).unwrap();
//! assert_eq!(volume.level, 7);
//! assert!(!volume.muted_preview);
//! ```

use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// Errors raised while persisting or rehydrating state.
#[derive(Error, Debug)]
pub enum PersistError {
    /// The storage backend failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A whitelisted field could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The stored record does not have the expected shape.
    #[error("Unexpected record shape for '{key}': {reason}")]
    Shape {
        /// Namespace of the record
        key: String,
        /// What was wrong with it
        reason: String,
    },
}

impl From<serde_json::Error> for PersistError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistError>;

/// A state slice with a whitelisted, durable subset of fields.
///
/// Usually derived with `#[derive(Persist)]` from `taskdeck-macros`.
pub trait Persist {
    /// Storage namespace for this slice.
    const KEY: &'static str;

    /// JSON object containing only the whitelisted fields.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Serialization`] if a field cannot be serialized.
    fn snapshot(&self) -> Result<Value>;

    /// Merge whitelisted fields from a stored record into `self`.
    ///
    /// Fields missing from the record keep their current value; fields not in
    /// the whitelist are ignored. On error `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Shape`] if the record is not an object, or
    /// [`PersistError::Serialization`] if a field fails to deserialize.
    fn restore(&mut self, value: Value) -> Result<()>;
}

/// Async key-value storage for persisted slices.
///
/// Implementations must be `Send + Sync` so the persistence writer can run on
/// a background task.
pub trait Storage: Send + Sync {
    /// Read the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if the backend fails.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Write (insert or replace) the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if the backend fails.
    fn save(&self, key: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Delete the record under `key` (no-op if absent).
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if the backend fails.
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Take the object map out of a stored record.
///
/// Used by derived [`Persist::restore`] implementations.
///
/// # Errors
///
/// Returns [`PersistError::Shape`] if `value` is not a JSON object.
pub fn into_object(key: &str, value: Value) -> Result<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PersistError::Shape {
            key: key.to_string(),
            reason: format!("expected an object, found {}", kind(&other)),
        }),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
