// Key-value blob storage

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A string-keyed store of opaque blobs
pub trait Storage {
    /// Read the blob under `key`, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob under `key` wholesale
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Directory-backed storage: one `<key>.json` file per key
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open or create storage rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create storage directory")?;
        debug!(dir = ?dir, "Opened file storage");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn lock_file(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(".lock"))
            .context("Failed to open storage lock file")
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        let lock = self.lock_file()?;
        lock.lock_shared().context("Failed to acquire shared lock")?;

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        debug!(key, bytes = bytes.len(), "Read blob");

        // Undecodable bytes are bad data, not a read failure
        let blob = match String::from_utf8(bytes) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(key, error = %e.utf8_error(), "Blob is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(blob))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("json.tmp");

        let lock = self.lock_file()?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        {
            let mut file = File::create(&temp_path).context("Failed to create temp file")?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(key, bytes = value.len(), "Wrote blob");
        Ok(())
    }
}

/// In-memory storage, handy for tests and demos
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.blobs.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("taskify");

        let storage = FileStorage::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.dir(), dir.as_path());
    }

    #[test]
    fn test_file_storage_missing_key() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);
    }

    #[test]
    fn test_file_storage_set_replaces() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();

        storage.set("todos", "[1]").unwrap();
        storage.set("todos", "[]").unwrap();

        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));
        assert_eq!(fs::read_to_string(temp.path().join("todos.json")).unwrap(), "[]");
        assert!(!temp.path().join("todos.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_keys_are_separate() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();

        storage.set("work", "a").unwrap();
        storage.set("home", "b").unwrap();
        assert_eq!(storage.get("work").unwrap().as_deref(), Some("a"));
        assert_eq!(storage.get("home").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("todos").unwrap(), None);
        storage.set("todos", "[]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_validate_key() {
        // Valid
        assert!(validate_key("todos").is_ok());
        assert!(validate_key("work-todos_2").is_ok());

        // Invalid
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a b").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_key_is_ascii_only() {
        assert!(validate_key(&"a".repeat(64)).is_ok());
        assert!(validate_key("tâches").is_err());
        assert!(validate_key("待办").is_err());
    }

    #[test]
    fn test_file_storage_invalid_utf8_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();
        fs::write(temp.path().join("todos.json"), b"[\xff\xfe]").unwrap();

        let blob = storage.get("todos").unwrap().unwrap();
        assert_eq!(blob, "[\u{fffd}\u{fffd}]");
    }
}
