//! # Event bus for broadcasting notification events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets the
//! admission controller and scheduler publish state-change notifications
//! without knowing who is listening.
//!
//! ## Architecture
//! ```text
//! Publishers:                          Subscriber (one):
//!   AdmissionController ──┐
//!   Simulation          ──┼──► Bus ───► subscriber_listener ───► SubscriberSet
//!   Runtime             ──┘ (broadcast)    (in Runtime)
//! ```
//!
//! portvisor uses a single listener (`Runtime::subscriber_listener`) that
//! fans events out to the user-provided subscribers via
//! [`SubscriberSet`](crate::SubscriberSet). The display collaborator never
//! holds authoritative state; it only consumes what the bus delivers.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never awaits,
//!   so it is safe to call from the synchronous simulation core.
//! - **Bounded capacity**: a single ring buffer stores recent events.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers
//!   at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for notification events.
///
/// Thin wrapper over [`tokio::sync::broadcast`] providing a
/// `publish`/`subscribe` API. Cheap to clone (internally holds an
/// `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// Capacity is shared across all receivers; the minimum is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped; this function still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events sent after it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::sim::SimTime;

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TickFired, SimTime::new(4)));
        let ev = rx.try_recv().expect("event delivered");
        assert_eq!(ev.kind, EventKind::TickFired);
        assert_eq!(ev.at, SimTime::new(4));
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(1);
        // No receiver; must not panic or block.
        bus.publish(Event::new(EventKind::TickFired, SimTime::ZERO));
    }
}
