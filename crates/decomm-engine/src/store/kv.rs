use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use decomm_core::errors::StoreError;
use decomm_core::traits::KeyValueStore;

use super::atomic::atomic_write;

/// One pretty-printed JSON document per key, at `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKvStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    key: key.to_string(),
                    source,
                })
            }
        };
        let value = serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(write_err)?;
        let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        atomic_write(&self.path_for(key), json.as_bytes()).map_err(write_err)?;
        tracing::debug!(key, path = %self.path_for(key).display(), "document saved");
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    docs: BTreeMap<String, Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.docs.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.docs.get(key)
    }
}

impl KeyValueStore for MemoryKvStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.docs.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_store_roundtrip_and_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut kv = FileKvStore::new(dir.path().join("data"));
        assert!(kv.load("telecom_rules").unwrap().is_none());

        kv.save("telecom_rules", &json!([{"id": "r1"}])).unwrap();
        assert_eq!(kv.load("telecom_rules").unwrap(), Some(json!([{"id": "r1"}])));
        assert!(kv.path_for("telecom_rules").exists());
    }

    #[test]
    fn corrupt_document_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("telecom_circuits.json"), "{not json").unwrap();
        let kv = FileKvStore::new(dir.path());
        assert!(matches!(
            kv.load("telecom_circuits"),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut kv = MemoryKvStore::new();
        assert!(kv.load("k").unwrap().is_none());
        kv.save("k", &json!(1)).unwrap();
        assert_eq!(kv.get("k"), Some(&json!(1)));
    }
}
