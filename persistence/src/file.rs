use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use taskdeck_core::persist::{PersistError, Result, Storage};

/// Storage backed by a directory of JSON files, one per namespace.
///
/// Writes go to `<key>.json.tmp` first and are renamed over `<key>.json`, so a
/// crash mid-write never leaves a truncated record behind.
///
/// # Example
///
/// ```no_run
/// use taskdeck_persistence::FileStorage;
/// use taskdeck_core::persist::Storage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = FileStorage::new(".taskdeck");
/// storage.save("counter", br#"{"value":3}"#).await?;
/// assert!(storage.load("counter").await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir` (created on first write)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `key`
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if `key` is empty or contains
    /// anything but ASCII letters, digits, `-` and `_`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(self.dir.join(format!("{key}.json")))
        } else {
            Err(PersistError::Storage(format!("invalid storage key '{key}'")))
        }
    }
}

fn io_error(action: &str, path: &Path, error: &std::io::Error) -> PersistError {
    PersistError::Storage(format!("failed to {action} {}: {error}", path.display()))
}

impl Storage for FileStorage {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error("read", &path, &error)),
        }
    }

    async fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error("create", &self.dir, &e))?;
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| io_error("write", &tmp, &e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error("replace", &path, &e))?;

        tracing::trace!(path = %path.display(), bytes = data.len(), "Wrote record");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error("remove", &path, &error)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can unwrap
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_record_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(storage.load("todo").await.unwrap().is_none());
        storage.remove("todo").await.unwrap();
    }

    #[tokio::test]
    async fn save_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.save("counter", br#"{"value":1}"#).await.unwrap();
        storage.save("counter", br#"{"value":2}"#).await.unwrap();

        let bytes = storage.load("counter").await.unwrap().unwrap();
        assert_eq!(bytes, br#"{"value":2}"#);
        assert!(dir.path().join("nested/counter.json").exists());
        assert!(!dir.path().join("nested/counter.json.tmp").exists());
    }

    #[tokio::test]
    async fn remove_deletes_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.save("todo", b"{}").await.unwrap();
        storage.remove("todo").await.unwrap();
        assert!(storage.load("todo").await.unwrap().is_none());
    }

    #[test]
    fn keys_cannot_escape_the_data_directory() {
        let storage = FileStorage::new("/data");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("").is_err());
        assert_eq!(
            storage.path_for("todo").unwrap(),
            PathBuf::from("/data/todo.json")
        );
    }
}
