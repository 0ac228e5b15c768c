//! # Admission controller — the core state machine.
//!
//! [`AdmissionController`] owns the aggregate state (slot pool, registry,
//! waiting queue) and is the only writer. Every client is in exactly one of
//! three states: disconnected, connected to one slot, or queued.
//!
//! ## Transitions
//! ```text
//! connect(c):
//!   connected?            ─► no-op
//!   slot free             ─► Connected(slot)
//!   full, c is user       ─► Queued (FIFO tail, deduplicated)
//!   full, c is admin      ─► evict one random connected user,
//!                             retry allocate once
//!                               ├─ ok   ─► Connected(slot), evicted user queued
//!                               └─ fail ─► Dropped (pool saturated with admins)
//!
//! disconnect(c):
//!   not connected         ─► no-op (queued clients stay queued)
//!   connected             ─► slot freed, unregistered
//!                             c was admin and none left ─► presence recovery:
//!                               connect(random admin from the full roster)
//!
//! reconcile():
//!   pop head, allocate; on failure push head back and stop the pass
//!   (strict FIFO fairness over throughput)
//! ```
//!
//! ## Rules
//! - Randomness is injected: eviction targets and recovery picks are drawn
//!   from the caller's RNG, so a fixed seed fixes every choice.
//! - Deferred work (re-queue delays, reconciliation delays) is scheduled by
//!   the [`Simulation`](crate::Simulation), not here; the controller only
//!   performs synchronous transitions.
//! - Every occupancy change publishes `SlotChanged`; every queue mutation
//!   publishes `QueueChanged`. Subscribers can mirror the full state from
//!   the bus alone.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::clients::{ClientClass, ClientId, Roster};
use crate::events::{Bus, Event, EventKind};
use crate::pool::{Registry, SlotPool, WaitQueue};
use crate::sim::SimTime;

use super::outcome::{ConnectOutcome, DisconnectOutcome};

/// Owns pool + registry + queue and implements the admission policy.
pub struct AdmissionController {
    slots: SlotPool,
    registry: Registry,
    wait_queue: WaitQueue,
    roster: Arc<Roster>,
    bus: Bus,
}

impl AdmissionController {
    /// Creates a controller over an empty pool of `capacity` slots.
    pub fn new(capacity: usize, roster: Arc<Roster>, bus: Bus) -> Self {
        Self {
            slots: SlotPool::new(capacity),
            registry: Registry::new(),
            wait_queue: WaitQueue::new(),
            roster,
            bus,
        }
    }

    /// Handles a connect request.
    ///
    /// Admins preempt: when the pool is full, one connected user (chosen
    /// uniformly from `rng`) is evicted and the allocation is retried once.
    /// If the retry still fails the request is dropped — admins never
    /// displace each other.
    ///
    /// # Panics
    /// Panics if `client` is not in the roster.
    pub fn connect(
        &mut self,
        client: &ClientId,
        rng: &mut impl Rng,
        now: SimTime,
    ) -> ConnectOutcome {
        let class = self.class_of(client);
        if self.registry.is_connected(client) {
            return ConnectOutcome::AlreadyConnected;
        }
        if let Some(slot) = self.slots.allocate(client.clone()) {
            self.admit(client, class, slot, now);
            return ConnectOutcome::Connected(slot);
        }

        match class {
            ClientClass::User => {
                if self.wait_queue.enqueue(client.clone()) {
                    self.bus
                        .publish(Event::new(EventKind::ClientQueued, now).with_client(client.clone()));
                    self.publish_queue(now);
                }
                ConnectOutcome::Queued
            }
            ClientClass::Admin => {
                let evicted = self.evict_random_user(rng, now);
                let outcome = match self.slots.allocate(client.clone()) {
                    Some(slot) => {
                        self.admit(client, class, slot, now);
                        ConnectOutcome::Connected(slot)
                    }
                    None => {
                        self.bus.publish(
                            Event::new(EventKind::ConnectDropped, now)
                                .with_client(client.clone())
                                .with_reason("pool saturated with admins, no eviction candidate"),
                        );
                        ConnectOutcome::Dropped
                    }
                };
                // Backfill pass runs after the admin's retry: the freed slot
                // belongs to the preempting admin, not to the queue head.
                if evicted.is_some() {
                    self.reconcile(now);
                }
                outcome
            }
        }
    }

    /// Handles a disconnect request.
    ///
    /// Only connected clients are affected; a queued client stays queued.
    /// If the departing client was the last connected admin, presence
    /// recovery immediately issues a connect for one admin chosen uniformly
    /// from the full roster (which may be the client that just left).
    pub fn disconnect(
        &mut self,
        client: &ClientId,
        rng: &mut impl Rng,
        now: SimTime,
    ) -> DisconnectOutcome {
        let Some(slot) = self.slots.find_occupant(client) else {
            return DisconnectOutcome::NotConnected;
        };
        let class = self.class_of(client);
        self.slots.release(slot);
        self.registry.mark_disconnected(client, class);
        self.publish_slot_free(slot, now);
        self.bus.publish(
            Event::new(EventKind::ClientDisconnected, now)
                .with_client(client.clone())
                .with_class(class)
                .with_slot(slot),
        );

        if class == ClientClass::Admin && !self.registry.any_admin_connected() {
            self.recover_admin_presence(rng, now);
        }
        DisconnectOutcome::Released { slot, class }
    }

    /// Deferred re-queue: enqueues `client` unless it is already queued or
    /// has reconnected in the meantime.
    ///
    /// The connected guard keeps the queue and the registry disjoint even
    /// when a recovered admin's stale re-queue timer fires.
    ///
    /// Returns `true` if the client entered the queue.
    pub fn requeue(&mut self, client: &ClientId, now: SimTime) -> bool {
        if self.registry.is_connected(client) || self.wait_queue.contains(client) {
            return false;
        }
        self.wait_queue.enqueue(client.clone());
        self.bus
            .publish(Event::new(EventKind::ClientQueued, now).with_client(client.clone()));
        self.publish_queue(now);
        true
    }

    /// Drains the waiting queue into free slots, head first.
    ///
    /// A single failed allocation halts the pass and restores the popped
    /// client to the head: strict FIFO fairness, even when a client further
    /// back would have fit.
    ///
    /// Returns the number of clients that acquired a slot.
    pub fn reconcile(&mut self, now: SimTime) -> usize {
        let mut drained = 0;
        while let Some(head) = self.wait_queue.dequeue() {
            match self.slots.allocate(head.clone()) {
                Some(slot) => {
                    let class = self.class_of(&head);
                    self.admit(&head, class, slot, now);
                    drained += 1;
                }
                None => {
                    self.wait_queue.push_front(head);
                    break;
                }
            }
        }
        if drained > 0 {
            self.publish_queue(now);
        }
        drained
    }

    /// Evicts one connected user chosen uniformly at random.
    ///
    /// No-op when no user is connected (the pool holds only admins). The
    /// victim is unregistered and appended to the queue tail.
    fn evict_random_user(&mut self, rng: &mut impl Rng, now: SimTime) -> Option<ClientId> {
        let candidates: Vec<usize> = self
            .slots
            .iter()
            .filter(|(_, occ)| {
                occ.is_some_and(|c| self.roster.class_of(c) == Some(ClientClass::User))
            })
            .map(|(i, _)| i)
            .collect();
        let &slot = candidates.choose(rng)?;

        let victim = self.slots.release(slot);
        self.registry.mark_disconnected(&victim, ClientClass::User);
        self.publish_slot_free(slot, now);
        self.bus.publish(
            Event::new(EventKind::ClientEvicted, now)
                .with_client(victim.clone())
                .with_slot(slot),
        );
        self.wait_queue.enqueue(victim.clone());
        self.publish_queue(now);
        Some(victim)
    }

    /// Reconnects one admin when none is connected.
    fn recover_admin_presence(&mut self, rng: &mut impl Rng, now: SimTime) {
        let Some(admin) = self.roster.admins().choose(rng) else {
            return;
        };
        let id = admin.id.clone();
        self.bus
            .publish(Event::new(EventKind::AdminRecovered, now).with_client(id.clone()));
        self.connect(&id, rng, now);
    }

    /// Registers the client and publishes the occupancy notifications.
    fn admit(&mut self, client: &ClientId, class: ClientClass, slot: usize, now: SimTime) {
        self.registry.mark_connected(client.clone(), class);
        self.bus.publish(
            Event::new(EventKind::SlotChanged, now)
                .with_slot(slot)
                .with_client(client.clone())
                .with_class(class),
        );
        self.bus.publish(
            Event::new(EventKind::ClientConnected, now)
                .with_client(client.clone())
                .with_class(class)
                .with_slot(slot),
        );
    }

    fn publish_slot_free(&self, slot: usize, now: SimTime) {
        self.bus
            .publish(Event::new(EventKind::SlotChanged, now).with_slot(slot));
    }

    fn publish_queue(&self, now: SimTime) {
        self.bus.publish(
            Event::new(EventKind::QueueChanged, now).with_queue(self.wait_queue.contents()),
        );
    }

    fn class_of(&self, client: &ClientId) -> ClientClass {
        self.roster
            .class_of(client)
            .unwrap_or_else(|| panic!("client {client} is not in the roster"))
    }

    /// Read access to the slot pool.
    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Read access to the waiting queue.
    pub fn wait_queue(&self) -> &WaitQueue {
        &self.wait_queue
    }

    /// Asserts the global invariants of the aggregate state.
    ///
    /// - connected count ≤ capacity, and equals the occupied-slot count
    /// - user/admin sets are disjoint
    /// - no queued client is connected
    /// - every occupant is registered under its roster class
    pub fn assert_invariants(&self) {
        let connected = self.registry.len();
        assert!(
            connected <= self.slots.capacity(),
            "connected {connected} exceeds capacity {}",
            self.slots.capacity()
        );
        assert_eq!(
            connected,
            self.slots.occupied_count(),
            "registry and pool disagree on occupancy"
        );
        assert!(
            self.registry
                .connected_users()
                .is_disjoint(self.registry.connected_admins()),
            "a client is registered in both class sets"
        );
        for queued in self.wait_queue.contents() {
            assert!(
                !self.registry.is_connected(&queued),
                "queued client {queued} is also connected"
            );
        }
        for (index, occ) in self.slots.iter() {
            if let Some(client) = occ {
                assert!(
                    self.registry.is_connected(client),
                    "slot {index} occupant {client} is not registered"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ConnectOutcome, DisconnectOutcome};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn setup(capacity: usize, users: usize, admins: usize) -> (AdmissionController, SmallRng) {
        let roster = Arc::new(Roster::generate(users, admins));
        let controller = AdmissionController::new(capacity, roster, Bus::new(64));
        (controller, SmallRng::seed_from_u64(0xC0FFEE))
    }

    fn id(name: &str) -> ClientId {
        ClientId::new(name)
    }

    #[test]
    fn test_connect_fills_slots_in_order() {
        let (mut c, mut rng) = setup(3, 3, 0);
        assert_eq!(c.connect(&id("user1"), &mut rng, SimTime::ZERO), ConnectOutcome::Connected(0));
        assert_eq!(c.connect(&id("user2"), &mut rng, SimTime::ZERO), ConnectOutcome::Connected(1));
        assert_eq!(c.connect(&id("user3"), &mut rng, SimTime::ZERO), ConnectOutcome::Connected(2));
        c.assert_invariants();
    }

    #[test]
    fn test_connect_twice_is_noop() {
        let (mut c, mut rng) = setup(2, 1, 0);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        assert_eq!(
            c.connect(&id("user1"), &mut rng, SimTime::ZERO),
            ConnectOutcome::AlreadyConnected
        );
        assert_eq!(c.registry().len(), 1);
    }

    #[test]
    fn test_user_queues_when_pool_full() {
        let (mut c, mut rng) = setup(1, 2, 0);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        assert_eq!(c.connect(&id("user2"), &mut rng, SimTime::ZERO), ConnectOutcome::Queued);
        assert_eq!(c.wait_queue().contents(), vec![id("user2")]);
        c.assert_invariants();
    }

    #[test]
    fn test_admin_preempts_one_user() {
        // N=2, clients [user1, user2, admin1]: both users connect, then the
        // admin preempts exactly one of them.
        let (mut c, mut rng) = setup(2, 2, 1);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        c.connect(&id("user2"), &mut rng, SimTime::ZERO);

        let outcome = c.connect(&id("admin1"), &mut rng, SimTime::new(1));
        assert!(matches!(outcome, ConnectOutcome::Connected(_)), "{outcome:?}");
        assert!(c.registry().is_connected(&id("admin1")));
        assert_eq!(c.registry().connected_users().len(), 1, "one user survives");
        assert_eq!(c.wait_queue().len(), 1, "the evicted user is queued");
        let queued = &c.wait_queue().contents()[0];
        assert!(!c.registry().is_connected(queued));
        c.assert_invariants();
    }

    #[test]
    fn test_admin_saturated_pool_drops_connect() {
        // Pool full of admins: no eviction candidate, request dropped.
        let (mut c, mut rng) = setup(2, 0, 3);
        c.connect(&id("admin1"), &mut rng, SimTime::ZERO);
        c.connect(&id("admin2"), &mut rng, SimTime::ZERO);

        assert_eq!(
            c.connect(&id("admin3"), &mut rng, SimTime::new(1)),
            ConnectOutcome::Dropped
        );
        assert!(!c.registry().is_connected(&id("admin3")));
        assert_eq!(c.slots().occupant(0), Some(&id("admin1")));
        assert_eq!(c.slots().occupant(1), Some(&id("admin2")));
        assert!(c.wait_queue().is_empty(), "admins are never queued");
        c.assert_invariants();
    }

    #[test]
    fn test_admin_presence_recovery_on_last_admin_disconnect() {
        // One connected admin leaves while a free slot and a second roster
        // admin exist: recovery must reconnect some admin in the same step.
        let (mut c, mut rng) = setup(2, 1, 2);
        c.connect(&id("admin1"), &mut rng, SimTime::ZERO);
        assert!(c.registry().any_admin_connected());

        let outcome = c.disconnect(&id("admin1"), &mut rng, SimTime::new(1));
        assert!(matches!(outcome, DisconnectOutcome::Released { .. }));
        assert!(
            c.registry().any_admin_connected(),
            "recovery must restore admin presence immediately"
        );
        c.assert_invariants();
    }

    #[test]
    fn test_recovery_may_reconnect_the_departed_admin() {
        // Single-admin roster: recovery's uniform pick over the full roster
        // can only choose admin1, which reconnects into its own freed slot.
        let (mut c, mut rng) = setup(2, 2, 1);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        c.connect(&id("admin1"), &mut rng, SimTime::ZERO);
        c.connect(&id("user2"), &mut rng, SimTime::ZERO); // queued
        assert_eq!(c.wait_queue().len(), 1);

        c.disconnect(&id("admin1"), &mut rng, SimTime::new(1));
        assert!(c.registry().is_connected(&id("admin1")));
        assert_eq!(c.wait_queue().len(), 1, "queue head did not steal the slot");
        c.assert_invariants();
    }

    #[test]
    fn test_disconnect_of_queued_client_is_noop() {
        let (mut c, mut rng) = setup(1, 2, 0);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        c.connect(&id("user2"), &mut rng, SimTime::ZERO); // queued
        assert_eq!(
            c.disconnect(&id("user2"), &mut rng, SimTime::new(1)),
            DisconnectOutcome::NotConnected
        );
        assert_eq!(c.wait_queue().contents(), vec![id("user2")], "stays queued");
    }

    #[test]
    fn test_reconcile_preserves_fifo_on_partial_drain() {
        // queue=[user3, user4], one slot frees up: only the head connects,
        // user4 keeps its position.
        let (mut c, mut rng) = setup(2, 4, 0);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        c.connect(&id("user2"), &mut rng, SimTime::ZERO);
        c.connect(&id("user3"), &mut rng, SimTime::ZERO);
        c.connect(&id("user4"), &mut rng, SimTime::ZERO);
        assert_eq!(c.wait_queue().contents(), vec![id("user3"), id("user4")]);

        c.disconnect(&id("user1"), &mut rng, SimTime::new(1));
        let drained = c.reconcile(SimTime::new(2));
        assert_eq!(drained, 1);
        assert!(c.registry().is_connected(&id("user3")));
        assert_eq!(c.wait_queue().contents(), vec![id("user4")]);
        c.assert_invariants();
    }

    #[test]
    fn test_reconcile_on_full_pool_leaves_queue_untouched() {
        let (mut c, mut rng) = setup(1, 3, 0);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        c.connect(&id("user2"), &mut rng, SimTime::ZERO);
        c.connect(&id("user3"), &mut rng, SimTime::ZERO);
        let before = c.wait_queue().contents();
        assert_eq!(c.reconcile(SimTime::new(1)), 0);
        assert_eq!(c.wait_queue().contents(), before);
    }

    #[test]
    fn test_requeue_skips_connected_and_queued_clients() {
        let (mut c, mut rng) = setup(2, 2, 0);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        assert!(!c.requeue(&id("user1"), SimTime::new(1)), "connected client");

        c.disconnect(&id("user1"), &mut rng, SimTime::new(2));
        assert!(c.requeue(&id("user1"), SimTime::new(3)));
        assert!(!c.requeue(&id("user1"), SimTime::new(4)), "already queued");
        assert_eq!(c.wait_queue().len(), 1);
        c.assert_invariants();
    }

    #[test]
    fn test_successive_preemptions_queue_victims_in_order() {
        let (mut c, mut rng) = setup(2, 2, 2);
        c.connect(&id("user1"), &mut rng, SimTime::ZERO);
        c.connect(&id("user2"), &mut rng, SimTime::ZERO);
        c.connect(&id("admin1"), &mut rng, SimTime::new(1));
        c.connect(&id("admin2"), &mut rng, SimTime::new(2));

        assert_eq!(c.registry().connected_admins().len(), 2);
        assert_eq!(c.registry().connected_users().len(), 0);
        let queued = c.wait_queue().contents();
        assert_eq!(queued.len(), 2, "both victims queued");
        assert_ne!(queued[0], queued[1]);
        c.assert_invariants();
    }
}
