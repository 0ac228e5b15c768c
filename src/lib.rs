//! # portvisor
//!
//! **Portvisor** is a discrete-event simulation of a fixed-capacity port
//! pool under contention from two client classes — ordinary users and
//! privileged admins — with randomized connect/disconnect churn, a FIFO
//! waiting queue, admin preemption, and a policy that keeps at least one
//! admin connected whenever a slot can be freed.
//!
//! The core is the admission/eviction/queueing state machine; rendering is
//! a collaborator that consumes notifications and holds no state of its own.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!              ┌───────────────────────────────────────────────┐
//!              │  Simulation (virtual clock + timeline)        │
//!              │  - Timeline: (fire_time, seq, action) heap    │
//!              │  - SmallRng (seedable, injected)              │
//!              │  - churn ticks: random disconnect batches     │
//!              └──────────────────────┬────────────────────────┘
//!                                     ▼
//!              ┌───────────────────────────────────────────────┐
//!              │  AdmissionController (the state machine)      │
//!              │  - SlotPool   (first-free-index allocation)   │
//!              │  - Registry   (users / admins, disjoint)      │
//!              │  - WaitQueue  (FIFO, deduplicated)            │
//!              │  policy: preemption, presence recovery,       │
//!              │          strict-FIFO reconciliation           │
//!              └──────────────────────┬────────────────────────┘
//!                                     │ publishes Events
//!                                     ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Bus (broadcast channel)                    │
//! └────────────────────────────────┬─────────────────────────────────┘
//!                                  ▼
//!                      ┌────────────────────────┐
//!                      │  subscriber_listener   │
//!                      │     (in Runtime)       │
//!                      └───┬────────────────┬───┘
//!                          ▼                ▼
//!                     SubscriberSet    ad-hoc receivers
//!                   ┌──────┼──────┐
//!                   ▼      ▼      ▼
//!                 grid    log    yours
//! ```
//!
//! ### Client lifecycle
//! ```text
//! Disconnected ──connect──► Connected(slot)
//!     ▲                        │
//!     │                        ├─ disconnect ─► slot freed
//!     │                        │     ├─ Requeue at +U[0,10] ─► Queued
//!     │                        │     └─ Reconcile at +1
//!     │                        └─ evicted (admin preemption) ─► Queued
//!     │                                                           │
//!     └──────────── reconciliation drains FIFO ◄──────────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Core**          | Deterministic admission/eviction/queueing state machine.      | [`AdmissionController`], [`Simulation`]   |
//! | **Scheduling**    | Explicit timeline: time-ordered, FIFO at equal times.         | [`Timeline`], [`Action`], [`SimTime`]     |
//! | **Events**        | Notification surface for rendering collaborators.             | [`Event`], [`EventKind`], [`Bus`]         |
//! | **Subscribers**   | Bounded fan-out with panic isolation.                         | [`Subscribe`], [`SubscriberSet`]          |
//! | **Rendering**     | Reference grid mirror built purely from notifications.        | [`GridWriter`]                            |
//! | **Runtime**       | Real-time pacing, OS signals, horizon stop.                   | [`Runtime`], [`SimConfig`]                |
//! | **Errors**        | Policy outcomes are values; config errors are typed.          | [`ConnectOutcome`], [`RuntimeError`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! A headless, fully deterministic run (no async runtime needed):
//! ```rust
//! use portvisor::{Bus, SimConfig, SimTime, Simulation};
//!
//! let cfg = SimConfig {
//!     seed: Some(7),
//!     ..SimConfig::default()
//! };
//! let mut sim = Simulation::new(&cfg, Bus::new(1024));
//! sim.run_until(SimTime::new(40));
//!
//! // 27 clients on 24 ports: an admin is always present once the startup
//! // connects have run, and the invariants hold at every step.
//! assert!(sim.controller().registry().any_admin_connected());
//! assert!(sim.controller().registry().len() <= cfg.capacity);
//! sim.controller().assert_invariants();
//! ```

mod clients;
mod config;
mod controller;
mod core;
mod error;
mod events;
mod pool;
mod sim;
mod subscribers;

// ---- Public re-exports ----

pub use clients::{Client, ClientClass, ClientId, Roster};
pub use config::{SimConfig, UniformRange};
pub use controller::{AdmissionController, ConnectOutcome, DisconnectOutcome};
pub use crate::core::Runtime;
pub use error::RuntimeError;
pub use events::{Bus, Event, EventKind};
pub use pool::{Registry, SlotPool, WaitQueue};
pub use sim::{Action, SimTime, Simulation, Timeline};
pub use subscribers::{GridWriter, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
