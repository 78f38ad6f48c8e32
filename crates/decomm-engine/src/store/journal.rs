use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

use decomm_core::errors::StoreError;

const GENESIS: &str = "genesis";

fn line_hash(line: &str) -> String {
    format!("sha256:{:x}", Sha256::digest(line.as_bytes()))
}

/// Append-only JSONL log of engine events.
///
/// Each entry carries `prev_hash`, the SHA-256 of the previous line, and the
/// first entry uses `"genesis"`. Editing, dropping or reordering any line
/// breaks [`Journal::verify`].
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn head(&self) -> Result<String, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(GENESIS.to_string()),
            Err(source) => {
                return Err(StoreError::Read {
                    key: "journal".into(),
                    source,
                })
            }
        };
        Ok(content
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(line_hash)
            .unwrap_or_else(|| GENESIS.to_string()))
    }

    /// Append entries, chaining each to the one before. Returns the new head hash.
    pub fn append(&self, entries: &[Value]) -> Result<String, StoreError> {
        let mut prev_hash = self.head()?;
        if entries.is_empty() {
            return Ok(prev_hash);
        }

        let mut buf = String::new();
        for entry in entries {
            let mut entry = entry.clone();
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("prev_hash".into(), Value::String(prev_hash.clone()));
                if !obj.contains_key("ts") {
                    obj.insert("ts".into(), Value::String(chrono::Utc::now().to_rfc3339()));
                }
            }
            let line = serde_json::to_string(&entry).map_err(|source| StoreError::Encode {
                key: "journal".into(),
                source,
            })?;
            prev_hash = line_hash(&line);
            buf.push_str(&line);
            buf.push('\n');
        }

        let write_err = |source| StoreError::Write {
            key: "journal".into(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        file.write_all(buf.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        tracing::debug!(entries = entries.len(), head = %prev_hash, "journal appended");
        Ok(prev_hash)
    }

    /// Read all entries. A missing journal is empty.
    pub fn entries(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read journal {}", self.path.display()))?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| format!("invalid JSON at line {}", i + 1))
            })
            .collect()
    }

    /// Verify the hash chain. Returns the number of entries.
    pub fn verify(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read journal {}", self.path.display()))?;

        let mut count = 0u64;
        let mut prev_hash = GENESIS.to_string();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: Value = serde_json::from_str(line)
                .with_context(|| format!("invalid JSON at line {}", i + 1))?;
            let entry_prev = entry
                .get("prev_hash")
                .and_then(Value::as_str)
                .unwrap_or(GENESIS);
            if entry_prev != prev_hash {
                bail!(
                    "hash chain broken at entry {count}: expected prev_hash '{prev_hash}', got '{entry_prev}'"
                );
            }
            prev_hash = line_hash(line);
            count += 1;
        }
        Ok(count)
    }
}
