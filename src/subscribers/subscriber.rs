//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] the extension point for plugging display
//! collaborators and other observers into the runtime. The spec-level
//! contract is one-way: subscribers receive state-change notifications and
//! hold no authoritative state of their own.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (a panicking subscriber never takes the runtime down)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue; on overflow the event is
//!   dropped for that subscriber alone.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Subscribers do not block the simulation or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use portvisor::{Event, EventKind, Subscribe};
//!
//! struct QueueDepth;
//!
//! #[async_trait]
//! impl Subscribe for QueueDepth {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::QueueChanged {
//!             let depth = ev.queue.as_ref().map_or(0, |q| q.len());
//!             let _ = depth; // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "queue-depth" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for simulation observability and rendering.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Treat delivered events as the only source of truth — the authoritative
///   state lives in the controller and is not shared.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    /// Events are delivered in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in drop/panic diagnostics.
    ///
    /// Prefer short, descriptive names (e.g., "grid", "log", "metrics").
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// On overflow the new event is dropped for this subscriber only; the
    /// runtime clamps capacity to a minimum of 1. Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
