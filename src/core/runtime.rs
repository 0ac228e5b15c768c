//! # Runtime: drives the simulation against wall-clock time.
//!
//! The [`Runtime`] owns the event bus, a [`SubscriberSet`], and the
//! validated configuration. It replays the virtual timeline in real time —
//! one virtual unit per [`SimConfig::time_unit`] — fans events out to the
//! subscribers, and handles OS termination signals.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   SimConfig + Vec<Arc<dyn Subscribe>>  ──►  Runtime
//!
//! Preparation:
//!   - SimConfig::validate() (done in Runtime::new)
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Main loop:
//!   next = sim.next_at()
//!     ├─ past horizon       ─► publish HorizonReached, exit
//!     ├─ OS signal / token  ─► publish ShutdownRequested, exit
//!     └─ deadline reached   ─► sim.step()  (controller publishes its events)
//! ```
//!
//! The simulation core never sees any of this: it stays synchronous and
//! deterministic, and tests drive it directly without a runtime.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use portvisor::{GridWriter, Runtime, SimConfig, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SimConfig::default();
//!     cfg.seed = Some(7);
//!     cfg.time_unit = Duration::from_millis(250);
//!     cfg.horizon = Some(60);
//!
//!     let grid = Arc::new(GridWriter::new(cfg.capacity, true));
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![grid];
//!
//!     let runtime = Runtime::new(cfg, subs)?;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SimConfig;
use crate::core::shutdown;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::sim::{SimTime, Simulation};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Paces the simulation in real time and delivers events to subscribers.
pub struct Runtime {
    cfg: SimConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").field("cfg", &self.cfg).finish_non_exhaustive()
    }
}

impl Runtime {
    /// Validates `cfg` and wires the bus and subscriber set.
    ///
    /// Must be called from within a tokio runtime (the subscriber set spawns
    /// one worker task per subscriber).
    pub fn new(
        cfg: SimConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, RuntimeError> {
        cfg.validate()?;
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Ok(Self { cfg, bus, subs })
    }

    /// The runtime's event bus, for additional ad-hoc receivers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs one simulation until the horizon is reached or a termination
    /// signal arrives.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        self.run_with_token(CancellationToken::new()).await
    }

    /// Like [`Runtime::run`], with an external cancellation handle.
    pub async fn run_with_token(&self, token: CancellationToken) -> Result<(), RuntimeError> {
        self.subscriber_listener();
        let mut sim = Simulation::new(&self.cfg, self.bus.clone());
        let horizon = self.cfg.horizon.map(SimTime::new);
        let start = tokio::time::Instant::now();

        let signal = shutdown::wait_for_shutdown_signal();
        tokio::pin!(signal);

        loop {
            let Some(next) = sim.next_at() else { break };
            if let Some(h) = horizon {
                if next > h {
                    self.bus.publish(Event::new(EventKind::HorizonReached, h));
                    break;
                }
            }
            let deadline = start + self.wall_offset(next);
            tokio::select! {
                observed = &mut signal => {
                    observed?;
                    self.bus
                        .publish(Event::new(EventKind::ShutdownRequested, sim.now()));
                    token.cancel();
                    break;
                }
                _ = token.cancelled() => {
                    self.bus
                        .publish(Event::new(EventKind::ShutdownRequested, sim.now()));
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    sim.step();
                }
            }
        }
        Ok(())
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        });
    }

    /// Wall-clock offset of a virtual instant from the run start.
    fn wall_offset(&self, at: SimTime) -> std::time::Duration {
        let units = u32::try_from(at.units()).unwrap_or(u32::MAX);
        self.cfg.time_unit.saturating_mul(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_cfg() -> SimConfig {
        SimConfig {
            seed: Some(5),
            time_unit: Duration::from_millis(1),
            horizon: Some(20),
            ..SimConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_stops_at_horizon() {
        let runtime = Runtime::new(fast_cfg(), Vec::new()).expect("valid config");
        let mut rx = runtime.bus().subscribe();
        runtime.run().await.expect("run to horizon");

        let mut saw_horizon = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::HorizonReached {
                saw_horizon = true;
                assert_eq!(ev.at, SimTime::new(20));
            }
        }
        assert!(saw_horizon, "horizon event must be published");
    }

    #[tokio::test]
    async fn test_cancellation_publishes_shutdown() {
        let cfg = SimConfig {
            horizon: None,
            ..fast_cfg()
        };
        let runtime = Runtime::new(cfg, Vec::new()).expect("valid config");
        let mut rx = runtime.bus().subscribe();

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        runtime.run_with_token(token).await.expect("cancelled run");

        let mut saw_shutdown = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ShutdownRequested {
                saw_shutdown = true;
            }
        }
        assert!(saw_shutdown, "shutdown event must be published");
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let cfg = SimConfig {
            capacity: 0,
            ..SimConfig::default()
        };
        let err = Runtime::new(cfg, Vec::new()).expect_err("zero capacity");
        assert_eq!(err.as_label(), "runtime_invalid_config");
    }
}
