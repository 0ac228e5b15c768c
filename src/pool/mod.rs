//! Leaf state structures: slot pool, connected-client registry, waiting queue.
//!
//! These three hold all authoritative state and contain no policy. The
//! [`AdmissionController`](crate::AdmissionController) owns one of each and
//! is the only writer.

mod queue;
mod registry;
mod slots;

pub use queue::WaitQueue;
pub use registry::Registry;
pub use slots::SlotPool;
