//! Synchronous publish/subscribe for store mutations.
//!
//! Consumers that render collection state subscribe here instead of
//! relying on any UI framework's reactivity. Stores call `notify` after a
//! successful slot write; subscribers run inline on the mutating thread.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Which persisted collection changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    LikedVideos,
    WatchLater,
    WatchHistory,
    Subscriptions,
    Playlists,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Updated,
    Cleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreEvent {
    pub collection: CollectionKind,
    pub change: ChangeKind,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Subscribers are invoked in subscription order, against a snapshot of
/// the subscriber list taken when `notify` starts. A callback may
/// subscribe, unsubscribe or mutate a store; subscription changes take
/// effect from the next notification.
#[derive(Default)]
pub struct EventHub {
    inner: Mutex<HubInner>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
}

impl EventHub {
    pub fn new() -> EventHub {
        EventHub::default()
    }

    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.insert(id, Arc::new(subscriber));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().unwrap().subscribers.remove(&id).is_some()
    }

    pub fn notify(&self, event: StoreEvent) {
        // Snapshot before invoking so callbacks can take the hub lock.
        let subscribers: Vec<Subscriber> = {
            let inner = self.inner.lock().unwrap();
            inner.subscribers.values().cloned().collect()
        };
        for subscriber in subscribers {
            subscriber(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const LIKE_ADDED: StoreEvent = StoreEvent {
        collection: CollectionKind::LikedVideos,
        change: ChangeKind::Added,
    };

    #[test]
    fn delivers_events_to_all_subscribers() {
        let hub = EventHub::new();
        let seen_a = Arc::new(AtomicUsize::new(0));
        let seen_b = Arc::new(AtomicUsize::new(0));

        let seen = seen_a.clone();
        hub.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let seen = seen_b.clone();
        hub.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(LIKE_ADDED);
        hub.notify(LIKE_ADDED);

        assert_eq!(seen_a.load(Ordering::SeqCst), 2);
        assert_eq!(seen_b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribed_callbacks_stop_receiving() {
        let hub = EventHub::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let id = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(LIKE_ADDED);
        assert!(hub.unsubscribe(id));
        hub.notify(LIKE_ADDED);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!hub.unsubscribe(id));
    }

    #[test]
    fn callback_can_unsubscribe_itself_during_notify() {
        let hub = Arc::new(EventHub::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let counter = seen.clone();
        let hub_ref = hub.clone();
        let id_ref = own_id.clone();
        let id = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *id_ref.lock().unwrap() {
                hub_ref.unsubscribe(id);
            }
        });
        *own_id.lock().unwrap() = Some(id);

        hub.notify(LIKE_ADDED);
        hub.notify(LIKE_ADDED);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn nested_notify_from_a_callback_does_not_deadlock() {
        let hub = Arc::new(EventHub::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let hub_ref = hub.clone();
        hub.subscribe(move |event| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                hub_ref.notify(*event);
            }
        });

        hub.notify(LIKE_ADDED);

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscribers_observe_the_event_payload() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let events = seen.clone();
        hub.subscribe(move |event| {
            events.lock().unwrap().push(*event);
        });

        hub.notify(StoreEvent {
            collection: CollectionKind::Subscriptions,
            change: ChangeKind::Removed,
        });

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].collection, CollectionKind::Subscriptions);
        assert_eq!(events[0].change, ChangeKind::Removed);
    }
}
