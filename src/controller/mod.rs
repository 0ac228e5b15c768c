//! Admission control: the core state machine and its policy outcomes.

mod core;
mod outcome;

pub use core::AdmissionController;
pub use outcome::{ConnectOutcome, DisconnectOutcome};
