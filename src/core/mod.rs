//! Async driver: real-time pacing, subscriber fan-out, shutdown handling.
//!
//! Internal modules:
//! - [`runtime`]: replays the virtual timeline against wall-clock time;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod runtime;
mod shutdown;

pub use runtime::Runtime;
