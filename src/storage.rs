//! Durable key-value storage.
//!
//! Values are JSON. The file backend keeps every key in one flat JSON object
//! on disk, which is the same layout the settings file uses.

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Process-lifetime store for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A flat JSON object file. Every change rewrites the whole file through a
/// temporary sibling that is renamed over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store; a file
    /// that is not a JSON object is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store {}", path.display()))?;
            if raw.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&raw)
                    .with_context(|| format!("Failed to parse store {}", path.display()))?
                {
                    Value::Object(map) => map,
                    other => {
                        return Err(anyhow!(
                            "Store {} holds {} instead of an object",
                            path.display(),
                            json_kind(&other)
                        ))
                    }
                }
            }
        } else {
            debug!("Store {} does not exist yet, starting empty", path.display());
            Map::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());
        store.set("a", json!({"0": true})).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!({"0": true})));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("Jn:1:1:el-GR", json!({"0": true, "1": false})).unwrap();
        store.set("other", json!(3)).unwrap();
        drop(store);

        let mut reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("Jn:1:1:el-GR").unwrap(),
            Some(json!({"0": true, "1": false}))
        );
        reopened.remove("other").unwrap();
        drop(reopened);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("other"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("absent.json")).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2]").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("an array"));

        fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
    }
}
