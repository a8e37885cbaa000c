//! pesa-enrich: the transaction enrichment pipeline.
//!
//! Layered resolution for raw statement descriptions: local heuristics
//! from pesa-core, a write-through cache over durable blob storage, and a
//! remote enrichment service consulted only for what the cheap layers
//! cannot resolve.

pub mod cache;
pub mod client;
pub mod events;
pub mod orchestrator;
pub mod retry;
pub mod store;

pub use cache::{CACHE_BLOB_KEY, EnrichedData, EnrichmentCache, MerchantInfo};
pub use client::{
    BatchItem, BatchResolution, CategoryExample, EnricherConfig, HttpEnricher, RemoteEnricher,
};
pub use events::{EventBus, MerchantResolved, SubscriberId};
pub use orchestrator::{
    BatchOutcome, FALLBACK_CATEGORY, Orchestrator, ResolutionSource, ResolvedTransaction,
    UNKNOWN_MERCHANT,
};
pub use retry::{RetryPolicy, with_backoff};
pub use store::{BlobStore, JsonFileStore, MemoryStore};
