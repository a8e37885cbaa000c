//! Durable blob storage seam for the enrichment cache.
//!
//! The contract is get-whole-blob / set-whole-blob: no partial updates, no
//! transactions. The cache serializes its full state on every write.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub trait BlobStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>>;
    fn write_blob(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: BlobStore> BlobStore for &mut T {
    fn read_blob(&self, key: &str) -> Result<Option<String>> {
        (**self).read_blob(key)
    }

    fn write_blob(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write_blob(key, value)
    }
}

/// One JSON file per blob key under a state directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for JsonFileStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>> {
        let p = self.path(key);
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        Ok(Some(s))
    }

    fn write_blob(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create {}", self.dir.display()))?;
        let p = self.path(key);
        fs::write(&p, value).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a blob, e.g. with corrupt content
    pub fn with_blob(mut self, key: &str, value: &str) -> Self {
        self.blobs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn blob(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl BlobStore for MemoryStore {
    fn read_blob(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write_blob(&mut self, key: &str, value: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read_blob("x").unwrap(), None);
        store.write_blob("x", "{}").unwrap();
        assert_eq!(store.read_blob("x").unwrap().as_deref(), Some("{}"));
    }
}
