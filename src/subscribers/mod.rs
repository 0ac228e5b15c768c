//! Subscriber fan-out: the notification surface for display collaborators.

mod grid;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use grid::GridWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
