//! # Policy outcomes of admission requests.
//!
//! Pool exhaustion is not an error: a connect request that cannot be
//! satisfied immediately resolves by queueing (users) or preemption
//! (admins), and in the worst case is dropped. These enums make the
//! resolution explicit to the caller; the same information is published on
//! the bus as events.
//!
//! ## Variants
//! - `Connected(slot)`: a slot was acquired (directly or after preemption).
//! - `AlreadyConnected`: the client already held a slot; nothing changed.
//! - `Queued`: pool full, client appended to the waiting queue (users only).
//! - `Dropped`: pool saturated with admins, preemption found no eviction
//!   candidate; the request is discarded.

use crate::clients::ClientClass;

/// Resolution of a connect request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Client acquired the slot at this index.
    Connected(usize),

    /// Client already held a slot; the request was a no-op.
    AlreadyConnected,

    /// Pool full; the client now waits in the FIFO queue.
    Queued,

    /// Pool saturated with admins; no eviction candidate existed and the
    /// request was discarded.
    Dropped,
}

/// Resolution of a disconnect request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The client's slot was released.
    Released {
        /// Index of the freed slot.
        slot: usize,
        /// Class of the departing client.
        class: ClientClass,
    },

    /// The client held no slot; the request was a no-op. A queued client
    /// stays queued.
    NotConnected,
}

impl ConnectOutcome {
    /// True when the request ended with the client holding a slot.
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            ConnectOutcome::Connected(_) | ConnectOutcome::AlreadyConnected
        )
    }
}
