//! One JSON file per key, replaced atomically on every write.

use chat_application::ports::storage::{KeyValueStore, StorageError};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// [`KeyValueStore`] keeping each key in `<dir>/<key>.json`.
///
/// Writes go to a sibling `.tmp` file which is synced and then renamed over
/// the target, so a crash mid-write leaves the previous contents intact.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.local/share/ollama-chat` or the platform equivalent.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("ollama-chat"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => {
                trace!("Read {} bytes from {}", content.len(), path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        store.set("ollama-chat-history", r#"{"sessions":[]}"#).unwrap();

        assert_eq!(
            store.get("ollama-chat-history").unwrap().as_deref(),
            Some(r#"{"sessions":[]}"#)
        );
        assert!(dir.path().join("nested/ollama-chat-history.json").exists());
        assert!(!dir.path().join("nested/ollama-chat-history.json.tmp").exists());
    }

    #[test]
    fn overwrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.set("k", "first, and longer").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn key_cannot_escape_directory() {
        let store = JsonFileStore::new("/data");
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/data/___etc_passwd.json"));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        // A directory where the file should be.
        fs::create_dir_all(store.path_for("k")).unwrap();
        assert!(store.get("k").is_err());
    }
}
