//! Entry store - an owned list of entries backed by a JSON file
//!
//! The file is a JSON array of entries, pretty-printed with four-space
//! indentation and non-ASCII text written as-is. The same format is used
//! for the default store, for exports and for imports.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entry::Entry;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse entries in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize entries: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Entry #{position} does not exist (store has {len} entries)")]
    OutOfRange { position: usize, len: usize },

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry name '{name}' is ambiguous, use a position instead: {positions:?}")]
    Ambiguous { name: String, positions: Vec<usize> },
}

/// How an import combines with what is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Imported entries replace the current list
    Replace,
    /// Imported entries are appended
    Merge,
}

/// The credential list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Load a store file; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no store file yet");
            return Ok(Self::new());
        }
        let entries = read_entries(path)?;
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded entries");
        Ok(Self { entries })
    }

    /// Write the store file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, self.to_json()?).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), count = self.entries.len(), "saved entries");
        Ok(())
    }

    /// Read entries from an exported file; returns how many were read
    pub fn import(&mut self, path: &Path, mode: ImportMode) -> Result<usize, StoreError> {
        let imported = read_entries(path)?;
        let count = imported.len();
        match mode {
            ImportMode::Replace => self.entries = imported,
            ImportMode::Merge => self.entries.extend(imported),
        }
        tracing::info!(path = %path.display(), count, ?mode, "imported entries");
        Ok(count)
    }

    /// Write all entries to an export file
    pub fn export(&self, path: &Path) -> Result<(), StoreError> {
        self.save(path)?;
        tracing::info!(path = %path.display(), count = self.entries.len(), "exported entries");
        Ok(())
    }

    /// Serialize in the on-disk format
    pub fn to_json(&self) -> Result<String, StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut serializer)?;
        // serde_json only ever writes UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Append an entry, returning its index
    pub fn add(&mut self, entry: Entry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Replace the entry at `index`
    pub fn update(&mut self, index: usize, entry: Entry) -> Result<(), StoreError> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { position: index + 1, len })?;
        *slot = entry;
        Ok(())
    }

    /// Remove and return the entry at `index`
    pub fn remove(&mut self, index: usize) -> Result<Entry, StoreError> {
        if index >= self.entries.len() {
            return Err(StoreError::OutOfRange {
                position: index + 1,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    /// Resolve a selector (1-based position or exact name) to an index
    pub fn resolve(&self, selector: &str) -> Result<usize, StoreError> {
        if let Ok(position) = selector.parse::<usize>() {
            if position == 0 || position > self.entries.len() {
                return Err(StoreError::OutOfRange {
                    position,
                    len: self.entries.len(),
                });
            }
            return Ok(position - 1);
        }

        let matches: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(selector))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => Err(StoreError::NotFound(selector.to_string())),
            [index] => Ok(*index),
            _ => Err(StoreError::Ambiguous {
                name: selector.to_string(),
                positions: matches.iter().map(|i| i + 1).collect(),
            }),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_entries(path: &Path) -> Result<Vec<Entry>, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir(test_name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = env::temp_dir().join(format!(
            "passkeep_store_test_{}_{}_{}",
            std::process::id(),
            test_name,
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_dir_all(path);
    }

    fn sample() -> EntryStore {
        EntryStore::from_entries(vec![
            Entry::new("mail", "alice", "pw1", "JBSWY3DPEHPK3PXP"),
            Entry::new("bank", "alice", "pw2", ""),
            Entry::new("邮箱", "张三", "密码", ""),
        ])
    }

    #[test]
    fn test_add_get_update_remove() {
        let mut store = EntryStore::new();
        assert!(store.is_empty());

        let index = store.add(Entry::new("a", "u", "p", ""));
        assert_eq!(index, 0);
        store.add(Entry::new("b", "u", "p", ""));
        assert_eq!(store.len(), 2);

        store.update(1, Entry::new("c", "v", "q", "")).unwrap();
        assert_eq!(store.get(1).unwrap().name, "c");

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(store.get(0).unwrap().name, "c");

        assert!(matches!(store.remove(5), Err(StoreError::OutOfRange { position: 6, len: 1 })));
        assert!(store.update(3, Entry::default()).is_err());
    }

    #[test]
    fn test_resolve() {
        let mut store = sample();
        assert_eq!(store.resolve("1").unwrap(), 0);
        assert_eq!(store.resolve("bank").unwrap(), 1);
        assert!(matches!(store.resolve("0"), Err(StoreError::OutOfRange { .. })));
        assert!(matches!(store.resolve("4"), Err(StoreError::OutOfRange { .. })));
        assert!(matches!(store.resolve("nope"), Err(StoreError::NotFound(_))));

        store.add(Entry::new("bank", "bob", "pw3", ""));
        match store.resolve("bank") {
            Err(StoreError::Ambiguous { positions, .. }) => assert_eq!(positions, vec![2, 4]),
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = temp_dir("missing");
        let store = EntryStore::load(&dir.join("entries.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_load() {
        let dir = temp_dir("save_load");
        let path = dir.join("nested").join("entries.json");

        let store = sample();
        store.save(&path).unwrap();

        let loaded = EntryStore::load(&path).unwrap();
        assert_eq!(loaded, store);

        cleanup(&dir);
    }

    #[test]
    fn test_file_format() {
        let store = EntryStore::from_entries(vec![Entry::new("邮箱", "u", "p", "")]);
        let json = store.to_json().unwrap();
        assert!(json.starts_with("[\n    {\n        \"name\": \"邮箱\""));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_import_replace_and_merge() {
        let dir = temp_dir("import");
        let export_path = dir.join("export.json");
        sample().export(&export_path).unwrap();

        let mut store = EntryStore::from_entries(vec![Entry::new("old", "", "", "")]);
        let count = store.import(&export_path, ImportMode::Merge).unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(0).unwrap().name, "old");

        let count = store.import(&export_path, ImportMode::Replace).unwrap();
        assert_eq!(count, 3);
        assert_eq!(store, sample());

        cleanup(&dir);
    }

    #[test]
    fn test_import_errors() {
        let dir = temp_dir("import_errors");
        fs::create_dir_all(&dir).unwrap();

        let mut store = sample();
        let missing = store.import(&dir.join("missing.json"), ImportMode::Replace);
        assert!(matches!(missing, Err(StoreError::Io { .. })));

        let bad = dir.join("bad.json");
        fs::write(&bad, r#"{"name": "not a list"}"#).unwrap();
        assert!(matches!(store.import(&bad, ImportMode::Replace), Err(StoreError::Parse { .. })));

        // a failed import leaves the store untouched
        assert_eq!(store, sample());

        cleanup(&dir);
    }
}
