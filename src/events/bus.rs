//! Synchronous in-process publish/subscribe
//!
//! Subscribers are keyed by [`EventKind`]. A publish delivers to every
//! current subscriber of that kind, in subscription order, before returning.

use ahash::AHashMap;

use crate::events::types::{EventKind, SimEvent};

/// Token identifying one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&SimEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: AHashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
    published: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&SimEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Register one handler for several kinds, collecting the ids
    pub fn subscribe_many<F>(&mut self, kinds: &[EventKind], handler: F) -> SubscriptionSet
    where
        F: FnMut(&SimEvent) + Clone + 'static,
    {
        let mut set = SubscriptionSet::new();
        for &kind in kinds {
            set.push(self.subscribe(kind, handler.clone()));
        }
        set
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.subscribers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sid, _)| *sid == id) {
                drop(handlers.remove(pos));
                return true;
            }
        }
        false
    }

    pub fn publish(&mut self, event: &SimEvent) {
        self.published += 1;
        if let Some(handlers) = self.subscribers.get_mut(&event.kind()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Total events published over the bus lifetime
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: AHashMap<EventKind, usize> = self
            .subscribers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .field("published", &self.published)
            .finish()
    }
}

/// Subscriptions owned by one collaborator
///
/// Released together when the owner is torn down. Releasing consumes the
/// set, so each id is dropped exactly once.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    ids: Vec<SubscriptionId>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: SubscriptionId) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Unsubscribe everything. Returns how many were still live.
    pub fn release(self, bus: &mut EventBus) -> usize {
        self.ids
            .into_iter()
            .filter(|id| bus.unsubscribe(*id))
            .count()
    }
}
