//! Change notification between store instances sharing a storage location.
//!
//! - One [`LocationShared`] per location, kept in a process-wide registry
//!   for as long as some store holds it
//! - Subscribers get bounded flume channels; delivery is best effort
//! - The same entry carries the lock that serializes read-merge-write

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use flume::{Receiver, Sender, TryRecvError, TrySendError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::models::PreferenceSnapshot;

/// Pending notifications a subscriber may hold before new ones are dropped.
const SUBSCRIPTION_BUFFER: usize = 64;

static LOCATIONS: Lazy<Mutex<HashMap<String, Weak<LocationShared>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one [`PreferenceStore`](super::PreferenceStore) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreInstanceId(u64);

impl StoreInstanceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A committed change, carrying the full snapshot after the commit.
#[derive(Debug, Clone)]
pub struct PreferenceChange {
    pub origin: StoreInstanceId,
    pub snapshot: PreferenceSnapshot,
}

/// Receiving end of a store subscription.
#[derive(Debug)]
pub struct PreferenceSubscription {
    rx: Receiver<PreferenceChange>,
}

impl PreferenceSubscription {
    /// A subscription that never yields anything.
    pub(crate) fn closed() -> Self {
        let (_, rx) = flume::bounded(1);
        Self { rx }
    }

    /// Waits for the next change. `None` once no store can publish any more.
    pub async fn recv(&self) -> Option<PreferenceChange> {
        self.rx.recv_async().await.ok()
    }

    pub fn try_recv(&self) -> Option<PreferenceChange> {
        match self.rx.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drains pending changes and returns only the newest.
    pub fn latest(&self) -> Option<PreferenceChange> {
        self.rx.try_iter().last()
    }
}

/// State shared by every store instance at one location.
#[derive(Debug, Default)]
pub(crate) struct LocationShared {
    pub(crate) write_lock: Mutex<()>,
    subscribers: Mutex<Vec<Sender<PreferenceChange>>>,
}

impl LocationShared {
    pub(crate) fn subscribe(&self) -> PreferenceSubscription {
        let (tx, rx) = flume::bounded(SUBSCRIPTION_BUFFER);
        self.subscribers.lock().push(tx);
        PreferenceSubscription { rx }
    }

    /// Sends `change` to every live subscriber. Returns how many got it.
    pub(crate) fn publish(&self, change: &PreferenceChange) -> usize {
        let mut delivered = 0;
        self.subscribers
            .lock()
            .retain(|tx| match tx.try_send(change.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!("Preference subscriber is full, dropping notification");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
        trace!(delivered, "Published preference change");
        delivered
    }
}

/// Shared entry for `location`, created when no live store holds one.
pub(crate) fn location(location: &str) -> Arc<LocationShared> {
    let mut locations = LOCATIONS.lock();
    if let Some(shared) = locations.get(location).and_then(Weak::upgrade) {
        return shared;
    }
    locations.retain(|_, entry| entry.strong_count() > 0);
    let shared = Arc::new(LocationShared::default());
    locations.insert(location.to_string(), Arc::downgrade(&shared));
    trace!(location, registered = locations.len(), "Registered preference location");
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(origin: StoreInstanceId) -> PreferenceChange {
        PreferenceChange {
            origin,
            snapshot: PreferenceSnapshot::new(),
        }
    }

    #[test]
    fn test_same_location_same_entry() {
        let a = location("test:notify-same");
        let b = location("test:notify-same");
        let c = location("test:notify-other");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_released_locations_leave_the_registry() {
        let first = location("test:notify-released");
        drop(first);
        let _other = location("test:notify-released-trigger");
        assert!(!LOCATIONS.lock().contains_key("test:notify-released"));

        let again = location("test:notify-released");
        let same = location("test:notify-released");
        assert!(Arc::ptr_eq(&again, &same));
        assert!(LOCATIONS.lock().contains_key("test:notify-released"));
    }

    #[test]
    fn test_publish_reaches_all_and_prunes_dropped() {
        let shared = location("test:notify-publish");
        let first = shared.subscribe();
        let second = shared.subscribe();
        let origin = StoreInstanceId::next();

        assert_eq!(shared.publish(&change(origin)), 2);
        assert_eq!(first.try_recv().unwrap().origin, origin);
        assert!(second.try_recv().is_some());

        drop(second);
        assert_eq!(shared.publish(&change(origin)), 1);
        assert_eq!(shared.subscribers.lock().len(), 1);
    }

    #[test]
    fn test_full_subscriber_drops_but_stays() {
        let shared = location("test:notify-full");
        let sub = shared.subscribe();
        let origin = StoreInstanceId::next();
        for _ in 0..SUBSCRIPTION_BUFFER {
            shared.publish(&change(origin));
        }
        assert_eq!(shared.publish(&change(origin)), 0);
        assert!(sub.latest().is_some());
        assert_eq!(shared.publish(&change(origin)), 1);
    }

    #[test]
    fn test_closed_subscription_is_silent() {
        let sub = PreferenceSubscription::closed();
        assert!(sub.try_recv().is_none());
        assert!(sub.latest().is_none());
    }
}
