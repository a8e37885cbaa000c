//! Typed event channel for merchant-name updates.
//!
//! Replaces ad-hoc callback registration with explicit subscribe /
//! unsubscribe. The orchestrator publishes whenever a remote resolution
//! lands in the cache, so listeners can refresh display names.

/// Fired when a remote resolution writes a new merchant mapping
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantResolved {
    pub cache_key: String,
    pub merchant: String,
    pub category: String,
}

pub type SubscriberId = u64;

type Callback = Box<dyn FnMut(&MerchantResolved)>;

#[derive(Default)]
pub struct EventBus {
    next_id: SubscriberId,
    subscribers: Vec<(SubscriberId, Callback)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&MerchantResolved) + 'static) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false when the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: &MerchantResolved) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }
}
