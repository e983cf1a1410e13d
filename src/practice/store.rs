use super::PracticeResults;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::verse::VerseKey;
use log::{debug, warn};

/// Persisted practice results, one record per verse and language.
///
/// Storage is best effort: failures are logged and the caller keeps working
/// from its in-memory results. An empty record is never written.
pub struct PracticeStore {
    backend: Box<dyn KeyValueStore>,
}

impl PracticeStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Stored results for `key`, or an empty map when nothing usable is stored.
    pub fn load(&self, key: &VerseKey) -> PracticeResults {
        let value = match self.backend.get(key.as_str()) {
            Ok(Some(value)) => value,
            Ok(None) => return PracticeResults::new(),
            Err(e) => {
                warn!("Failed to read practice record {}: {}", key, e);
                return PracticeResults::new();
            }
        };
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Discarding malformed practice record {}: {}", key, e);
            PracticeResults::new()
        })
    }

    /// Replaces the record for `key`. Saving an empty map removes it.
    pub fn save(&mut self, key: &VerseKey, results: &PracticeResults) {
        if results.is_empty() {
            self.clear(key);
            return;
        }
        let value = match serde_json::to_value(results) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize practice record {}: {}", key, e);
                return;
            }
        };
        match self.backend.set(key.as_str(), value) {
            Ok(()) => debug!("Saved {} results for {}", results.len(), key),
            Err(e) => warn!("Failed to save practice record {}: {}", key, e),
        }
    }

    pub fn clear(&mut self, key: &VerseKey) {
        if let Err(e) = self.backend.remove(key.as_str()) {
            warn!("Failed to clear practice record {}: {}", key, e);
        }
    }
}
