//! # Global simulation configuration.
//!
//! Provides [`SimConfig`] centralized settings for the simulation core and
//! the async runtime, and [`UniformRange`] a small inclusive-range sampler
//! used for the randomized delays and batch sizes.
//!
//! Config is used in two ways:
//! 1. **Simulation creation**: `Simulation::new(&config, bus)`
//! 2. **Runtime creation**: `Runtime::new(config, subscribers)` (validated)
//!
//! ## Sentinel values
//! - `seed = None` → seed the RNG from OS entropy (non-reproducible run)
//! - `horizon = None` → run until cancelled (the churn tick re-arms forever)

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::RuntimeError;

/// Inclusive uniform integer range, sampled with an injected RNG.
///
/// Used for the randomized knobs of the scheduler: disconnect batch size,
/// disconnect delay, and re-queue delay.
///
/// ## Example
/// ```rust
/// use portvisor::UniformRange;
/// use rand::{rngs::SmallRng, SeedableRng};
///
/// let range = UniformRange::new(1, 5);
/// let mut rng = SmallRng::seed_from_u64(7);
/// let n = range.sample(&mut rng);
/// assert!((1..=5).contains(&n));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformRange {
    /// Inclusive lower bound.
    pub min: u64,
    /// Inclusive upper bound.
    pub max: u64,
}

impl UniformRange {
    /// Creates a range; `min` must not exceed `max` (checked by
    /// [`SimConfig::validate`], not here).
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Draws a uniform value from `[min, max]`.
    pub fn sample(&self, rng: &mut impl Rng) -> u64 {
        rng.random_range(self.min..=self.max)
    }

    /// True when the bounds are ordered.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// Global configuration for the simulation.
///
/// Defines:
/// - **Pool shape**: slot capacity and client population
/// - **Churn cadence**: tick interval and randomized delay ranges
/// - **Determinism**: optional RNG seed
/// - **Runtime pacing**: wall-clock length of one virtual time unit
/// - **Event system**: bus capacity for notification delivery
///
/// ## Notes
/// All fields are public for flexibility. [`SimConfig::validate`] rejects
/// configurations the scheduler cannot run (zero capacity, empty population,
/// inverted ranges).
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Number of slots in the pool.
    pub capacity: usize,

    /// Number of user clients in the population.
    pub users: usize,

    /// Number of admin clients in the population.
    pub admins: usize,

    /// Virtual time units between churn ticks.
    pub tick_interval: u64,

    /// Delay before the first churn tick fires.
    pub first_tick: u64,

    /// How many clients each tick selects for disconnection.
    ///
    /// Sampled per tick; the result is clamped to the population size.
    pub disconnect_batch: UniformRange,

    /// Per-client delay between a tick and the scheduled disconnect.
    pub disconnect_delay: UniformRange,

    /// Delay between a disconnect and the client re-entering the queue.
    pub requeue_delay: UniformRange,

    /// Fixed delay between a disconnect and the queue reconciliation pass
    /// that tries to drain the freed slot.
    pub reconcile_delay: u64,

    /// RNG seed. `None` seeds from OS entropy.
    ///
    /// Fixing the seed makes the whole run reproducible: eviction targets,
    /// recovery choices, tick batches, and all delays.
    pub seed: Option<u64>,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items. Minimum value is 1
    /// (enforced by Bus).
    pub bus_capacity: usize,

    /// Wall-clock duration of one virtual time unit when driven by
    /// [`Runtime`](crate::Runtime). Ignored by the synchronous core.
    pub time_unit: Duration,

    /// Stop after this many virtual time units. `None` = run until cancelled.
    pub horizon: Option<u64>,
}

impl SimConfig {
    /// Total population size.
    #[inline]
    pub fn population(&self) -> usize {
        self.users + self.admins
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Builds the simulation RNG from `seed`, or from OS entropy.
    pub fn build_rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }

    /// Rejects configurations the scheduler cannot run.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.capacity == 0 {
            return Err(RuntimeError::invalid_config("capacity must be at least 1"));
        }
        if self.population() == 0 {
            return Err(RuntimeError::invalid_config("population is empty"));
        }
        if self.tick_interval == 0 {
            return Err(RuntimeError::invalid_config(
                "tick_interval must be at least 1",
            ));
        }
        for (name, range) in [
            ("disconnect_batch", self.disconnect_batch),
            ("disconnect_delay", self.disconnect_delay),
            ("requeue_delay", self.requeue_delay),
        ] {
            if !range.is_valid() {
                return Err(RuntimeError::invalid_config(format!(
                    "{name}: min {} exceeds max {}",
                    range.min, range.max
                )));
            }
        }
        if self.disconnect_batch.min == 0 {
            return Err(RuntimeError::invalid_config(
                "disconnect_batch must select at least one client",
            ));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    /// Default configuration — the reference router scenario:
    ///
    /// - `capacity = 24` ports
    /// - `users = 23`, `admins = 4` (27 clients contending for 24 slots)
    /// - `tick_interval = 4`, `first_tick = 1`
    /// - `disconnect_batch = 1..=5`, `disconnect_delay = 1..=2`
    /// - `requeue_delay = 0..=10`, `reconcile_delay = 1`
    /// - `seed = None` (entropy), `bus_capacity = 1024`
    /// - `time_unit = 1s`, `horizon = None`
    fn default() -> Self {
        Self {
            capacity: 24,
            users: 23,
            admins: 4,
            tick_interval: 4,
            first_tick: 1,
            disconnect_batch: UniformRange::new(1, 5),
            disconnect_delay: UniformRange::new(1, 2),
            requeue_delay: UniformRange::new(0, 10),
            reconcile_delay: 1,
            seed: None,
            bus_capacity: 1024,
            time_unit: Duration::from_secs(1),
            horizon: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let cfg = SimConfig {
            capacity: 0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let cfg = SimConfig {
            requeue_delay: UniformRange::new(10, 0),
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_uniform_range_bounds() {
        let range = UniformRange::new(3, 3);
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..16 {
            assert_eq!(range.sample(&mut rng), 3);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let cfg = SimConfig {
            seed: Some(42),
            ..SimConfig::default()
        };
        let mut a = cfg.build_rng();
        let mut b = cfg.build_rng();
        let range = UniformRange::new(0, 1000);
        for _ in 0..8 {
            assert_eq!(range.sample(&mut a), range.sample(&mut b));
        }
    }
}
