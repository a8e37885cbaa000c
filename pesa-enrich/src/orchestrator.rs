//! Enrichment orchestrator: heuristics, then rule table, then cache, then
//! the remote service, each layer consulted only when the previous one
//! produced no category.
//!
//! Remote failure is never surfaced to the caller on this path; it decays
//! to an "Unknown"/"Other" result. The only observable side effects are
//! cache writes and the merchant-resolved events they publish.

use pesa_core::{Transaction, category_for, extract_merchant};
use tracing::warn;

use crate::cache::{EnrichedData, EnrichmentCache, MerchantInfo};
use crate::client::{BatchItem, CategoryExample, RemoteEnricher};
use crate::events::{EventBus, MerchantResolved};
use crate::store::BlobStore;

pub const UNKNOWN_MERCHANT: &str = "Unknown";
pub const FALLBACK_CATEGORY: &str = "Other";

/// Which cascade layer produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    RuleTable,
    Cache,
    Remote,
    Fallback,
}

/// A transaction with merchant and category resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTransaction {
    pub txn: Transaction,
    pub enriched_info: Option<MerchantInfo>,
    pub source: ResolutionSource,
}

/// Per-item outcome of a batched run, carrying the caller-supplied index
/// so results can be scattered back regardless of remote reordering.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub index: usize,
    pub data: EnrichedData,
    pub source: ResolutionSource,
}

pub struct Orchestrator<'a, S: BlobStore, R: RemoteEnricher> {
    cache: &'a mut EnrichmentCache<S>,
    remote: &'a R,
    events: &'a mut EventBus,
}

fn apply(txn: &Transaction, data: EnrichedData, source: ResolutionSource) -> ResolvedTransaction {
    let mut txn = txn.clone();
    txn.merchant = data.merchant;
    txn.category = data.category;
    ResolvedTransaction {
        txn,
        enriched_info: data.enriched_info,
        source,
    }
}

fn fallback_data(identified_merchant: Option<&str>) -> EnrichedData {
    EnrichedData {
        merchant: identified_merchant.unwrap_or(UNKNOWN_MERCHANT).to_string(),
        category: FALLBACK_CATEGORY.to_string(),
        enriched_info: None,
    }
}

impl<'a, S: BlobStore, R: RemoteEnricher> Orchestrator<'a, S, R> {
    pub fn new(
        cache: &'a mut EnrichmentCache<S>,
        remote: &'a R,
        events: &'a mut EventBus,
    ) -> Self {
        Self {
            cache,
            remote,
            events,
        }
    }

    /// Resolve one transaction through the full cascade.
    pub async fn enrich(
        &mut self,
        txn: &Transaction,
        examples: &[CategoryExample],
    ) -> ResolvedTransaction {
        let heuristic = extract_merchant(&txn.description);

        // Layer 2: rule-table hit ends the cascade, cache and remote are
        // skipped entirely
        if let Some(merchant) = &heuristic.merchant {
            if let Some(category) = category_for(merchant) {
                let data = EnrichedData {
                    merchant: merchant.clone(),
                    category: category.to_string(),
                    enriched_info: None,
                };
                return apply(txn, data, ResolutionSource::RuleTable);
            }
        }

        // Layer 3: cached resolution. The heuristic name wins over the
        // cached one when both exist; it is fresher for display.
        if let Some(hit) = self.cache.get(&heuristic.cache_key).cloned() {
            let data = EnrichedData {
                merchant: heuristic.merchant.clone().unwrap_or(hit.merchant),
                category: hit.category,
                enriched_info: hit.enriched_info,
            };
            return apply(txn, data, ResolutionSource::Cache);
        }

        // Layer 4: remote, with the identified merchant as a hint
        match self
            .remote
            .resolve_one(&txn.description, heuristic.merchant.as_deref(), examples)
            .await
        {
            Ok(resolved) => {
                self.commit(&heuristic.cache_key, &resolved);
                let data = EnrichedData {
                    merchant: heuristic
                        .merchant
                        .clone()
                        .unwrap_or_else(|| resolved.merchant.clone()),
                    category: resolved.category,
                    enriched_info: resolved.enriched_info,
                };
                apply(txn, data, ResolutionSource::Remote)
            }
            Err(e) => {
                warn!("remote enrichment failed for {}: {e:#}", txn.id);
                apply(
                    txn,
                    fallback_data(heuristic.merchant.as_deref()),
                    ResolutionSource::Fallback,
                )
            }
        }
    }

    /// Layers 3-4 over a prepared batch: one remote round-trip for all
    /// unresolved items, per-item fallback on partial results, whole-batch
    /// fallback on transport failure. Outcomes come back sorted by the
    /// caller-supplied index.
    pub async fn enrich_batch(
        &mut self,
        items: &[BatchItem],
        examples: &[CategoryExample],
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        let mut pending: Vec<BatchItem> = Vec::new();

        for item in items {
            match self.cache.get(&item.cache_key).cloned() {
                Some(hit) => outcomes.push(BatchOutcome {
                    index: item.index,
                    data: EnrichedData {
                        merchant: item.identified_merchant.clone().unwrap_or(hit.merchant),
                        category: hit.category,
                        enriched_info: hit.enriched_info,
                    },
                    source: ResolutionSource::Cache,
                }),
                None => pending.push(item.clone()),
            }
        }

        if !pending.is_empty() {
            match self.remote.resolve_batch(&pending, examples).await {
                Ok(resolutions) => {
                    let mut by_index: std::collections::HashMap<usize, EnrichedData> = resolutions
                        .into_iter()
                        .map(|r| (r.index, r.data))
                        .collect();
                    for item in &pending {
                        match by_index.remove(&item.index) {
                            Some(resolved) => {
                                self.commit(&item.cache_key, &resolved);
                                outcomes.push(BatchOutcome {
                                    index: item.index,
                                    data: EnrichedData {
                                        merchant: item
                                            .identified_merchant
                                            .clone()
                                            .unwrap_or_else(|| resolved.merchant.clone()),
                                        category: resolved.category,
                                        enriched_info: resolved.enriched_info,
                                    },
                                    source: ResolutionSource::Remote,
                                });
                            }
                            None => outcomes.push(BatchOutcome {
                                index: item.index,
                                data: fallback_data(item.identified_merchant.as_deref()),
                                source: ResolutionSource::Fallback,
                            }),
                        }
                    }
                }
                Err(e) => {
                    warn!("batch enrichment failed for {} items: {e:#}", pending.len());
                    for item in &pending {
                        outcomes.push(BatchOutcome {
                            index: item.index,
                            data: fallback_data(item.identified_merchant.as_deref()),
                            source: ResolutionSource::Fallback,
                        });
                    }
                }
            }
        }

        outcomes.sort_by_key(|o| o.index);
        outcomes
    }

    /// Full cascade over a collection: local layers per item, then one
    /// batched remote call for whatever is left, scattered back into input
    /// order.
    pub async fn enrich_all(
        &mut self,
        txns: &[Transaction],
        examples: &[CategoryExample],
    ) -> Vec<ResolvedTransaction> {
        let mut out: Vec<Option<ResolvedTransaction>> = vec![None; txns.len()];
        let mut pending = Vec::new();

        for (index, txn) in txns.iter().enumerate() {
            let heuristic = extract_merchant(&txn.description);
            if let Some(merchant) = &heuristic.merchant {
                if let Some(category) = category_for(merchant) {
                    let data = EnrichedData {
                        merchant: merchant.clone(),
                        category: category.to_string(),
                        enriched_info: None,
                    };
                    out[index] = Some(apply(txn, data, ResolutionSource::RuleTable));
                    continue;
                }
            }
            pending.push(BatchItem {
                index,
                description: txn.description.clone(),
                cache_key: heuristic.cache_key,
                identified_merchant: heuristic.merchant,
            });
        }

        for outcome in self.enrich_batch(&pending, examples).await {
            let txn = &txns[outcome.index];
            out[outcome.index] = Some(apply(txn, outcome.data, outcome.source));
        }

        out.into_iter()
            .map(|r| r.expect("every transaction resolves or falls back"))
            .collect()
    }

    fn commit(&mut self, cache_key: &str, data: &EnrichedData) {
        // Persistence failure degrades durability, not the enrichment
        if let Err(e) = self.cache.set(cache_key, data.clone()) {
            warn!("cache persist failed for {cache_key}: {e:#}");
        }
        self.events.publish(&MerchantResolved {
            cache_key: cache_key.to_string(),
            merchant: data.merchant.clone(),
            category: data.category.clone(),
        });
    }
}
