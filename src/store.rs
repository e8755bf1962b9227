//! Record persistence
//!
//! Stores are handed to the pipeline explicitly; there is no process-wide
//! client. Every saved record gets a fresh UUID v4 id.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::extraction::ListingRecord;

/// Destination for extracted records, grouped in named collections.
pub trait RecordStore: Send + Sync {
    /// Persist `record` in `collection`, returning its generated id.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the collection name is invalid or the write fails.
    fn save(&self, collection: &str, record: &ListingRecord) -> Result<String, StoreError>;

    /// Number of records saved in `collection`.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the collection name is invalid or cannot be read.
    fn count(&self, collection: &str) -> Result<usize, StoreError>;
}

/// Accept non-empty names made of ASCII letters, digits, `_` and `-`.
///
/// # Errors
///
/// [`StoreError::InvalidCollection`] otherwise.
pub fn validate_collection(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// In-process store, mainly for tests and one-off runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, ListingRecord)>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a saved record by collection and id.
    pub fn get(&self, collection: &str, id: &str) -> Option<ListingRecord> {
        self.collections
            .read()
            .get(collection)?
            .iter()
            .find(|(saved_id, _)| saved_id == id)
            .map(|(_, record)| record.clone())
    }
}

impl RecordStore for MemoryStore {
    fn save(&self, collection: &str, record: &ListingRecord) -> Result<String, StoreError> {
        validate_collection(collection)?;
        let id = new_id();
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), record.clone()));
        debug!(collection, %id, "record stored in memory");
        Ok(id)
    }

    fn count(&self, collection: &str) -> Result<usize, StoreError> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .map_or(0, Vec::len))
    }
}

/// Appends each record as one JSON line to `<dir>/<collection>.jsonl`.
///
/// Each line is the serialized [`ListingRecord`] plus an `_id` field.
#[derive(Debug)]
pub struct JsonLinesStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "JSON lines store opened");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// File backing `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.jsonl"))
    }
}

impl RecordStore for JsonLinesStore {
    fn save(&self, collection: &str, record: &ListingRecord) -> Result<String, StoreError> {
        validate_collection(collection)?;
        let id = new_id();

        let mut value = serde_json::to_value(record)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("_id".to_string(), serde_json::Value::String(id.clone()));
        }
        let mut line = serde_json::to_string(&value)?;
        line.push('\n');

        let path = self.collection_path(collection);
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;

        debug!(collection, %id, path = %path.display(), "record appended");
        Ok(id)
    }

    fn count(&self, collection: &str) -> Result<usize, StoreError> {
        validate_collection(collection)?;
        let path = self.collection_path(collection);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(contents.lines().filter(|l| !l.trim().is_empty()).count()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Attributes;

    fn record(title: &str) -> ListingRecord {
        ListingRecord {
            raw: "<html></html>".to_string(),
            text: String::new(),
            title: title.to_string(),
            post_date: "2017-09-26T14:53:47-0700".to_string(),
            titletextonly: None,
            price_text: None,
            price: None,
            thumb_links: vec![],
            map: None,
            attributes: Attributes::new(),
            post_text: String::new(),
            notices: vec![],
            url: Some("https://example.org/1.html".to_string()),
        }
    }

    #[test]
    fn test_validate_collection() {
        assert!(validate_collection("motorcycles").is_ok());
        assert!(validate_collection("sfbay_mcy-2017").is_ok());
        assert!(validate_collection("").is_err());
        assert!(validate_collection("../etc").is_err());
        assert!(validate_collection("has space").is_err());
        assert!(validate_collection(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let first = store.save("bikes", &record("one")).unwrap();
        let second = store.save("bikes", &record("two")).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.count("bikes").unwrap(), 2);
        assert_eq!(store.count("cars").unwrap(), 0);
        assert_eq!(store.get("bikes", &second).unwrap().title, "two");
        assert!(store.get("cars", &first).is_none());
    }

    #[test]
    fn test_memory_store_rejects_bad_collection() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.save("bad/name", &record("x")),
            Err(StoreError::InvalidCollection(_))
        ));
    }

    #[test]
    fn test_json_lines_store_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.count("bikes").unwrap(), 0);
        let id = store.save("bikes", &record("one")).unwrap();
        store.save("bikes", &record("two")).unwrap();
        assert_eq!(store.count("bikes").unwrap(), 2);

        let contents = fs::read_to_string(store.collection_path("bikes")).unwrap();
        let first: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(first["_id"], id.as_str());
        assert_eq!(first["title"], "one");
        assert_eq!(first["url"], "https://example.org/1.html");
    }
}
