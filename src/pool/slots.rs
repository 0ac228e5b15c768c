//! # Fixed-capacity slot pool.
//!
//! [`SlotPool`] is the physical resource being contended for: an ordered
//! array of N slots, each free or occupied by exactly one client.
//!
//! ## Rules
//! - Allocation scans in index order and takes the **lowest free index**.
//!   The scan order is deterministic on purpose: identical histories produce
//!   identical slot assignments, which keeps seeded runs reproducible.
//! - Releasing a free slot is an invariant violation and panics. The
//!   admission controller only releases slots it just looked up, so this
//!   state is not reachable from the public API.

use crate::clients::ClientId;

/// Ordered pool of N slots, each holding at most one client.
#[derive(Clone, Debug)]
pub struct SlotPool {
    slots: Vec<Option<ClientId>>,
}

impl SlotPool {
    /// Creates a pool with `capacity` free slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Occupies the first free slot (lowest index) with `client`.
    ///
    /// Returns `None` when the pool is full. The caller is responsible for
    /// not allocating a client that already holds a slot.
    pub fn allocate(&mut self, client: ClientId) -> Option<usize> {
        debug_assert!(
            self.find_occupant(&client).is_none(),
            "client {client} already occupies a slot"
        );
        let index = self.slots.iter().position(|s| s.is_none())?;
        self.slots[index] = Some(client);
        Some(index)
    }

    /// Frees the slot at `index`, returning the client that held it.
    ///
    /// # Panics
    /// Panics if the slot is already free — that indicates a controller bug,
    /// not a recoverable condition.
    pub fn release(&mut self, index: usize) -> ClientId {
        self.slots[index]
            .take()
            .unwrap_or_else(|| panic!("release of free slot {index}"))
    }

    /// Finds the slot currently held by `client`, if any.
    pub fn find_occupant(&self, client: &ClientId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref() == Some(client))
    }

    /// The occupant of `index`, or `None` when free.
    pub fn occupant(&self, index: usize) -> Option<&ClientId> {
        self.slots[index].as_ref()
    }

    /// Pool capacity N.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no slot is free.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Iterates `(index, occupant)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&ClientId>)> {
        self.slots.iter().enumerate().map(|(i, s)| (i, s.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ClientId {
        ClientId::new(name)
    }

    #[test]
    fn test_allocate_takes_lowest_free_index() {
        let mut pool = SlotPool::new(3);
        assert_eq!(pool.allocate(id("a")), Some(0));
        assert_eq!(pool.allocate(id("b")), Some(1));
        pool.release(0);
        // Slot 0 is free again and must be preferred over slot 2.
        assert_eq!(pool.allocate(id("c")), Some(0));
    }

    #[test]
    fn test_allocate_on_full_pool_returns_none() {
        let mut pool = SlotPool::new(2);
        pool.allocate(id("a"));
        pool.allocate(id("b"));
        assert!(pool.is_full());
        assert_eq!(pool.allocate(id("c")), None);
    }

    #[test]
    fn test_find_occupant() {
        let mut pool = SlotPool::new(4);
        pool.allocate(id("a"));
        pool.allocate(id("b"));
        assert_eq!(pool.find_occupant(&id("b")), Some(1));
        assert_eq!(pool.find_occupant(&id("ghost")), None);
    }

    #[test]
    fn test_release_returns_occupant() {
        let mut pool = SlotPool::new(1);
        pool.allocate(id("a"));
        assert_eq!(pool.release(0), id("a"));
        assert_eq!(pool.occupied_count(), 0);
    }

    #[test]
    #[should_panic(expected = "release of free slot")]
    fn test_release_of_free_slot_panics() {
        let mut pool = SlotPool::new(2);
        pool.release(1);
    }
}
