//! # FIFO waiting queue with deduplicated membership.
//!
//! [`WaitQueue`] holds clients waiting for a slot, strictly in arrival
//! order. A client appears at most once; re-enqueueing is an idempotent
//! no-op. Reconciliation pops from the head and, on a failed allocation,
//! pushes the client back to the **head** so the original order is
//! preserved across partial drains.

use std::collections::VecDeque;

use crate::clients::ClientId;

/// Deduplicated FIFO queue of clients awaiting a slot.
#[derive(Clone, Debug, Default)]
pub struct WaitQueue {
    queue: VecDeque<ClientId>,
}

impl WaitQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `client` to the tail unless it is already queued.
    ///
    /// Returns `true` if the client was inserted.
    pub fn enqueue(&mut self, client: ClientId) -> bool {
        if self.queue.contains(&client) {
            return false;
        }
        self.queue.push_back(client);
        true
    }

    /// Pops the head of the queue.
    pub fn dequeue(&mut self) -> Option<ClientId> {
        self.queue.pop_front()
    }

    /// Puts `client` back at the head (failed-drain push-back).
    pub fn push_front(&mut self, client: ClientId) {
        debug_assert!(
            !self.queue.contains(&client),
            "client {client} pushed back while still queued"
        );
        self.queue.push_front(client);
    }

    /// True when `client` is queued.
    pub fn contains(&self, client: &ClientId) -> bool {
        self.queue.contains(client)
    }

    /// Ordered snapshot of the queue, head first. Does not mutate.
    pub fn contents(&self) -> Vec<ClientId> {
        self.queue.iter().cloned().collect()
    }

    /// Number of queued clients.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ClientId {
        ClientId::new(name)
    }

    #[test]
    fn test_fifo_order() {
        let mut q = WaitQueue::new();
        q.enqueue(id("a"));
        q.enqueue(id("b"));
        q.enqueue(id("c"));
        assert_eq!(q.dequeue(), Some(id("a")));
        assert_eq!(q.dequeue(), Some(id("b")));
        assert_eq!(q.dequeue(), Some(id("c")));
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut q = WaitQueue::new();
        assert!(q.enqueue(id("a")));
        assert!(q.enqueue(id("b")));
        // Re-enqueueing must change neither length nor order.
        assert!(!q.enqueue(id("a")));
        assert_eq!(q.len(), 2);
        assert_eq!(q.contents(), vec![id("a"), id("b")]);
    }

    #[test]
    fn test_push_front_restores_head() {
        let mut q = WaitQueue::new();
        q.enqueue(id("a"));
        q.enqueue(id("b"));
        let head = q.dequeue().unwrap();
        q.push_front(head);
        assert_eq!(q.contents(), vec![id("a"), id("b")]);
    }
}
