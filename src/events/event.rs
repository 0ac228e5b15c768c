//! # Notification events emitted by the admission controller and scheduler.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Rendering events**: per-slot and per-queue state changes, the surface
//!   a display collaborator needs (`SlotChanged`, `QueueChanged`)
//! - **Lifecycle events**: why the state changed (connected, disconnected,
//!   queued, evicted, recovered, dropped)
//! - **Scheduler events**: churn ticks, horizon, shutdown
//!
//! The [`Event`] struct carries additional metadata such as the virtual
//! timestamp, the client and its class, the slot index, and queue snapshots.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Consumers that mirror state (e.g.
//! [`GridWriter`](crate::GridWriter)) use `seq` to reject stale deliveries.
//!
//! ## Example
//! ```rust
//! use portvisor::{ClientClass, ClientId, Event, EventKind, SimTime};
//!
//! let ev = Event::new(EventKind::ClientConnected, SimTime::new(3))
//!     .with_client(ClientId::new("user7"))
//!     .with_class(ClientClass::User)
//!     .with_slot(4);
//!
//! assert_eq!(ev.kind, EventKind::ClientConnected);
//! assert_eq!(ev.client.as_ref().map(|c| c.as_str()), Some("user7"));
//! assert_eq!(ev.slot, Some(4));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::clients::{ClientClass, ClientId};
use crate::sim::SimTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of notification events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Rendering events ===
    /// A slot's occupancy changed.
    ///
    /// Sets:
    /// - `slot`: slot index
    /// - `client`: new occupant, or `None` when the slot was freed
    /// - `class`: occupant class (absent when freed)
    /// - `at`, `seq`
    SlotChanged,

    /// The waiting queue changed.
    ///
    /// Sets:
    /// - `queue`: ordered snapshot of queued client ids
    /// - `at`, `seq`
    QueueChanged,

    // === Lifecycle events ===
    /// A client acquired a slot.
    ///
    /// Sets:
    /// - `client`, `class`, `slot`
    /// - `at`, `seq`
    ClientConnected,

    /// A client released its slot (scheduled churn, not eviction).
    ///
    /// Sets:
    /// - `client`, `class`, `slot`
    /// - `at`, `seq`
    ClientDisconnected,

    /// A client entered the waiting queue.
    ///
    /// Sets:
    /// - `client`
    /// - `at`, `seq`
    ClientQueued,

    /// A connected user was evicted to free a slot for an admin.
    ///
    /// Sets:
    /// - `client`: the evicted user
    /// - `slot`: the slot it held
    /// - `at`, `seq`
    ClientEvicted,

    /// Admin-presence recovery picked an admin to reconnect.
    ///
    /// Sets:
    /// - `client`: the chosen admin
    /// - `at`, `seq`
    AdminRecovered,

    /// An admin connect request was dropped: the pool was saturated with
    /// admins and preemption found no eviction candidate.
    ///
    /// Sets:
    /// - `client`, `reason`
    /// - `at`, `seq`
    ConnectDropped,

    // === Scheduler events ===
    /// A churn tick fired and scheduled a batch of disconnects.
    ///
    /// Sets:
    /// - `count`: batch size
    /// - `at`, `seq`
    TickFired,

    /// The configured horizon was reached; the runtime is stopping.
    ///
    /// Sets:
    /// - `at`, `seq`
    HorizonReached,

    /// Shutdown requested (OS signal observed or token cancelled).
    ///
    /// Sets:
    /// - `at`, `seq`
    ShutdownRequested,
}

/// Notification event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: virtual timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Virtual timestamp.
    pub at: SimTime,
    /// Event classification.
    pub kind: EventKind,

    /// Client the event refers to, if applicable.
    pub client: Option<ClientId>,
    /// Class of that client, where it matters for rendering.
    pub class: Option<ClientClass>,
    /// Slot index, for occupancy events.
    pub slot: Option<usize>,
    /// Ordered queue snapshot (`QueueChanged` only).
    pub queue: Option<Arc<[ClientId]>>,
    /// Batch size (`TickFired` only).
    pub count: Option<u32>,
    /// Human-readable reason (`ConnectDropped`).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind at the given virtual time,
    /// with the next global sequence number.
    pub fn new(kind: EventKind, at: SimTime) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at,
            kind,
            client: None,
            class: None,
            slot: None,
            queue: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a client id.
    #[inline]
    pub fn with_client(mut self, client: ClientId) -> Self {
        self.client = Some(client);
        self
    }

    /// Attaches a client class.
    #[inline]
    pub fn with_class(mut self, class: ClientClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Attaches a slot index.
    #[inline]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches an ordered queue snapshot.
    #[inline]
    pub fn with_queue(mut self, queue: impl Into<Arc<[ClientId]>>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Attaches a batch size.
    #[inline]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for the two rendering kinds a display collaborator consumes.
    #[inline]
    pub fn is_rendering(&self) -> bool {
        matches!(self.kind, EventKind::SlotChanged | EventKind::QueueChanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TickFired, SimTime::ZERO);
        let b = Event::new(EventKind::TickFired, SimTime::ZERO);
        assert!(b.seq > a.seq, "seq must increase: {} then {}", a.seq, b.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::SlotChanged, SimTime::new(2))
            .with_slot(5)
            .with_client(ClientId::new("user1"))
            .with_class(ClientClass::User);
        assert_eq!(ev.slot, Some(5));
        assert_eq!(ev.class, Some(ClientClass::User));
        assert!(ev.is_rendering());
        assert!(!Event::new(EventKind::TickFired, SimTime::ZERO).is_rendering());
    }

    #[test]
    fn test_queue_snapshot_roundtrip() {
        let snapshot = vec![ClientId::new("user1"), ClientId::new("user2")];
        let ev = Event::new(EventKind::QueueChanged, SimTime::ZERO).with_queue(snapshot);
        let queue = ev.queue.expect("snapshot attached");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].as_str(), "user1");
    }
}
