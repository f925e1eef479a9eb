//! Structured cache observability.
//!
//! Reclamation and background-load failures are invisible to callers by
//! design: garbage collection reports nothing, and a failed async task is
//! dropped rather than re-raised. The [`EventHub`] makes both observable as
//! structured events so tools and tests can assert on them instead of
//! scraping log output.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// An observable cache occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Garbage collection removed the entry under `key`.
    Reclaimed { key: String },
    /// A background load task for `key` failed and was dropped.
    AsyncLoadFailed { key: String, error: String },
}

/// Fan-out hub for [`CacheEvent`]s.
///
/// Subscribers receive every event emitted after they subscribe. Dropping a
/// receiver unsubscribes it; the hub prunes disconnected subscribers on the
/// next emit.
#[derive(Default)]
pub struct EventHub {
    subscribers: Mutex<Vec<Sender<CacheEvent>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber.
    pub fn emit(&self, event: CacheEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_receives_events() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        hub.emit(CacheEvent::Reclaimed { key: "a".into() });
        assert_eq!(rx.recv().unwrap(), CacheEvent::Reclaimed { key: "a".into() });
    }

    #[test]
    fn events_fan_out_to_all_subscribers() {
        let hub = EventHub::new();
        let rx1 = hub.subscribe();
        let rx2 = hub.subscribe();
        hub.emit(CacheEvent::AsyncLoadFailed {
            key: "tex".into(),
            error: "boom".into(),
        });
        assert!(rx1.recv().is_ok());
        assert!(rx2.recv().is_ok());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        drop(rx);
        // Must not fail or grow the subscriber list.
        hub.emit(CacheEvent::Reclaimed { key: "a".into() });
        hub.emit(CacheEvent::Reclaimed { key: "b".into() });
        assert!(hub.subscribers.lock().is_empty());
    }

    #[test]
    fn no_events_before_subscription() {
        let hub = EventHub::new();
        hub.emit(CacheEvent::Reclaimed { key: "early".into() });
        let rx = hub.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
