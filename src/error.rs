//! Error types used by the portvisor runtime.
//!
//! The simulation has no I/O failure mode: pool exhaustion, preemption
//! failure, and queueing are **policy outcomes**, reported through
//! [`ConnectOutcome`](crate::ConnectOutcome) and
//! [`DisconnectOutcome`](crate::DisconnectOutcome), not errors.
//! Inconsistent-state operations (double-connect, releasing a free slot) are
//! programming errors and assert.
//!
//! [`RuntimeError`] covers what remains: rejecting a configuration the
//! scheduler cannot run, and signal-registration failures while the async
//! runtime is driving the simulation.

use thiserror::Error;

/// # Errors produced by the portvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration was rejected by [`SimConfig::validate`](crate::SimConfig::validate).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// OS signal listener registration failed.
    #[error("signal registration failed: {source}")]
    Signal {
        #[from]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Shorthand constructor for [`RuntimeError::InvalidConfig`].
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        RuntimeError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use portvisor::RuntimeError;
    ///
    /// let err = RuntimeError::invalid_config("capacity must be at least 1");
    /// assert_eq!(err.as_label(), "runtime_invalid_config");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig { .. } => "runtime_invalid_config",
            RuntimeError::Signal { .. } => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidConfig { reason } => format!("invalid config: {reason}"),
            RuntimeError::Signal { source } => format!("signal registration failed: {source}"),
        }
    }
}
