//! Enrichment cache: cache key to previously resolved merchant/category.
//!
//! Hydrated once from the blob store via `load()`, after which the
//! in-memory map is the single source of truth. Every `set` serializes the
//! entire map back out (write-through, full snapshot). Entries have no TTL
//! and no eviction; a key maps to at most one value, last writer wins.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::store::BlobStore;

pub const CACHE_BLOB_KEY: &str = "enrichment_cache";

/// Extra merchant details a remote resolution may carry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchantInfo {
    pub official_name: String,
    pub website: Option<String>,
}

/// A resolved enrichment, keyed by cache key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedData {
    pub merchant: String,
    pub category: String,
    pub enriched_info: Option<MerchantInfo>,
}

pub struct EnrichmentCache<S: BlobStore> {
    store: S,
    entries: HashMap<String, EnrichedData>,
    hydrated: bool,
}

impl<S: BlobStore> EnrichmentCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: HashMap::new(),
            hydrated: false,
        }
    }

    /// Hydrate from durable storage. Idempotent: only the first call reads
    /// the blob. Missing or corrupted state loads as an empty cache.
    pub fn load(&mut self) -> Result<()> {
        if self.hydrated {
            return Ok(());
        }
        match self.store.read_blob(CACHE_BLOB_KEY)? {
            Some(blob) => match serde_json::from_str::<HashMap<String, EnrichedData>>(&blob) {
                Ok(map) => self.entries = map,
                Err(e) => {
                    warn!("discarding corrupt enrichment cache: {e}");
                    self.entries = HashMap::new();
                }
            },
            None => self.entries = HashMap::new(),
        }
        self.hydrated = true;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&EnrichedData> {
        self.entries.get(key)
    }

    /// Insert and immediately persist the whole map.
    pub fn set(&mut self, key: impl Into<String>, data: EnrichedData) -> Result<()> {
        self.entries.insert(key.into(), data);
        self.flush()
    }

    /// Serialize the full map to the blob store.
    pub fn flush(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.entries)?;
        self.store.write_blob(CACHE_BLOB_KEY, &blob)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &EnrichedData)> {
        self.entries.iter()
    }
}
