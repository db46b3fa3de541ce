//! Key-value byte stores
//!
//! The todo list is persisted as one value under one key. [`FileKvStore`]
//! keeps each key in its own file (`{dir}/{key}.json`). Readers take a shared
//! lock and writers an exclusive lock on a `{key}.lock` file next to it, and
//! writes land through a unique temp file renamed over the target.
//! [`MemoryKvStore`] keeps values in memory.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;

/// A store mapping string keys to byte values
pub trait KvStore {
    /// Reads a value; `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes a value, replacing any previous one
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// File-backed store, one file per key
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Creates a store rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the file a key is stored in
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Readers and writers of a key lock this file, never the value itself
    fn lock_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", key))
    }

    fn open_lock(&self, key: &str) -> Result<File> {
        let lock_path = self.lock_path_for(key);
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);

        // Nothing written yet; don't create the directory just to read
        if !self.dir.is_dir() {
            return Ok(None);
        }

        let lock = self.open_lock(key)?;
        lock.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {}", path.display()))?;

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()))
            }
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        // Lock is released when the lock file is dropped
        Ok(Some(bytes))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.path_for(key);

        let lock = self.open_lock(key)?;
        lock.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", path.display()))?;

        let mut temp = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temp file in {}", self.dir.display()))?;
        temp.write_all(value)
            .with_context(|| format!("Failed to write {}", temp.path().display()))?;
        temp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush {}", temp.path().display()))?;

        // Atomic rename
        temp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one value
    pub fn with_value(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.into());
        store
    }

    /// Makes every subsequent write fail
    pub fn fail_writes(mut self, fail: bool) -> Self {
        self.fail_writes = fail;
        self
    }

    /// Returns the raw value under a key
    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes {
            bail!("Write to '{}' refused: store is read-only", key);
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = FileKvStore::new(dir.path());

        assert!(store.get("todos").unwrap().is_none());
    }

    #[test]
    fn write_and_read_value() {
        let dir = TempDir::new().unwrap();
        let mut store = FileKvStore::new(dir.path());

        store.set("todos", b"[1,2,3]").unwrap();

        assert_eq!(store.get("todos").unwrap(), Some(b"[1,2,3]".to_vec()));
        assert!(dir.path().join("todos.json").is_file());
    }

    #[test]
    fn overwrite_replaces_value() {
        let dir = TempDir::new().unwrap();
        let mut store = FileKvStore::new(dir.path());

        store.set("todos", b"a much longer first value").unwrap();
        store.set("todos", b"short").unwrap();

        assert_eq!(store.get("todos").unwrap(), Some(b"short".to_vec()));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = FileKvStore::new(dir.path().join("nested").join("dir"));

        store.set("todos", b"[]").unwrap();

        assert!(store.path_for("todos").exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let mut store = FileKvStore::new(dir.path());

        store.set("todos", b"[]").unwrap();

        // Only the value and its lock file remain
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["todos.json", "todos.lock"]);
    }

    #[test]
    fn read_does_not_create_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let store = FileKvStore::new(&missing);

        assert!(store.get("todos").unwrap().is_none());
        assert!(!missing.exists());
    }

    #[test]
    fn concurrent_writers_leave_a_whole_value() {
        let dir = TempDir::new().unwrap();
        let short = b"[]".to_vec();
        let long = format!(
            "[{{\"text\":\"{}\",\"done\":false}}]",
            "a long todo written by writer two ".repeat(20)
        )
        .into_bytes();

        let writers: Vec<_> = [short.clone(), long.clone()]
            .into_iter()
            .map(|value| {
                let mut store = FileKvStore::new(dir.path());
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.set("todos", &value).unwrap();
                    }
                })
            })
            .collect();

        let reader = {
            let store = FileKvStore::new(dir.path());
            let (short, long) = (short.clone(), long.clone());
            std::thread::spawn(move || {
                for _ in 0..100 {
                    if let Some(bytes) = store.get("todos").unwrap() {
                        assert!(bytes == short || bytes == long);
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        let stored = FileKvStore::new(dir.path()).get("todos").unwrap().unwrap();
        assert!(stored == short || stored == long);
        serde_json::from_slice::<serde_json::Value>(&stored).unwrap();
    }

    #[test]
    fn keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut store = FileKvStore::new(dir.path());

        store.set("a", b"1").unwrap();
        store.set("b", b"2").unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryKvStore::new();
        assert!(store.get("todos").unwrap().is_none());

        store.set("todos", b"[]").unwrap();
        assert_eq!(store.raw("todos"), Some(&b"[]"[..]));
    }

    #[test]
    fn memory_store_can_refuse_writes() {
        let mut store = MemoryKvStore::with_value("todos", "[]").fail_writes(true);

        assert!(store.set("todos", b"[1]").is_err());
        assert_eq!(store.get("todos").unwrap(), Some(b"[]".to_vec()));
    }
}
