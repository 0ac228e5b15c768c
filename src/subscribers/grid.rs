//! # GridWriter: reference rendering collaborator.
//!
//! [`GridWriter`] mirrors the slot grid and the waiting queue purely from
//! `SlotChanged` / `QueueChanged` notifications and renders them as the
//! classic 8-column port board:
//!
//! ```text
//! Port  1: user1     Port  2: user2     ...  Port  8: user8
//! Port  9: user9     Port 10: Admin     ...  Port 16: Free
//! Port 17: user17    Port 18: user18    ...  Port 24: Admin
//! Queue: user3, user12
//! ```
//!
//! Admins are rendered by class, users by name, free slots as `Free` —
//! matching the display contract of the simulated router panel.
//!
//! ## Rules
//! - Holds **no authoritative state**: everything it knows arrived on the
//!   bus. The unit tests use this to prove the notification surface is
//!   sufficient to render from.
//! - Stale deliveries (event `seq` not newer than the last applied one) are
//!   rejected, so an out-of-order replay cannot corrupt the mirror.
//! - With `echo` enabled, one frame is printed per churn tick.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::clients::{ClientClass, ClientId};
use crate::events::{Event, EventKind};

use super::Subscribe;

/// Number of port cells per rendered row.
const COLUMNS: usize = 8;

#[derive(Default)]
struct GridState {
    last_seq: Option<u64>,
    slots: Vec<Option<(ClientId, ClientClass)>>,
    queue: Vec<ClientId>,
}

/// Event-driven mirror of the slot grid and waiting queue.
pub struct GridWriter {
    state: Mutex<GridState>,
    echo: bool,
}

impl GridWriter {
    /// Creates a mirror for a pool of `capacity` slots. `echo = true`
    /// prints a rendered frame on every churn tick.
    pub fn new(capacity: usize, echo: bool) -> Self {
        Self {
            state: Mutex::new(GridState {
                last_seq: None,
                slots: vec![None; capacity],
                queue: Vec::new(),
            }),
            echo,
        }
    }

    /// Applies one event to the mirror. Synchronous entry point shared by
    /// [`Subscribe::on_event`], tests, and headless demos.
    pub fn apply(&self, ev: &Event) {
        let mut state = self.state.lock().expect("grid mirror poisoned");
        if state.last_seq.is_some_and(|last| ev.seq <= last) {
            return; // stale delivery
        }
        state.last_seq = Some(ev.seq);

        match ev.kind {
            EventKind::SlotChanged => {
                let Some(index) = ev.slot else { return };
                if index >= state.slots.len() {
                    return;
                }
                state.slots[index] = match (&ev.client, ev.class) {
                    (Some(client), Some(class)) => Some((client.clone(), class)),
                    _ => None,
                };
            }
            EventKind::QueueChanged => {
                if let Some(queue) = &ev.queue {
                    state.queue = queue.to_vec();
                }
            }
            EventKind::TickFired => {
                if self.echo {
                    println!("{}", self.render_locked(&state));
                }
            }
            _ => {}
        }
    }

    /// Renders the mirrored grid and queue as text.
    pub fn render(&self) -> String {
        let state = self.state.lock().expect("grid mirror poisoned");
        self.render_locked(&state)
    }

    /// Mirrored occupant of a slot: `None` for free.
    pub fn slot(&self, index: usize) -> Option<(ClientId, ClientClass)> {
        let state = self.state.lock().expect("grid mirror poisoned");
        state.slots.get(index).cloned().flatten()
    }

    /// Mirrored queue, head first.
    pub fn queue(&self) -> Vec<ClientId> {
        let state = self.state.lock().expect("grid mirror poisoned");
        state.queue.clone()
    }

    fn render_locked(&self, state: &GridState) -> String {
        let mut out = String::new();
        for (i, cell) in state.slots.iter().enumerate() {
            let label = match cell {
                None => "Free".to_string(),
                Some((_, ClientClass::Admin)) => "Admin".to_string(),
                Some((client, ClientClass::User)) => client.to_string(),
            };
            out.push_str(&format!("Port {:>2}: {:<10}", i + 1, label));
            if (i + 1) % COLUMNS == 0 {
                out.push('\n');
            }
        }
        if state.slots.len() % COLUMNS != 0 {
            out.push('\n');
        }
        let queue: Vec<String> = state.queue.iter().map(|c| c.to_string()).collect();
        out.push_str(&format!("Queue: {}", queue.join(", ")));
        out
    }
}

#[async_trait]
impl Subscribe for GridWriter {
    async fn on_event(&self, event: &Event) {
        self.apply(event);
    }

    fn name(&self) -> &'static str {
        "grid"
    }

    fn queue_capacity(&self) -> usize {
        2048
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::events::Bus;
    use crate::sim::{SimTime, Simulation};

    #[test]
    fn test_mirror_tracks_slot_and_queue_events() {
        let grid = GridWriter::new(2, false);
        let ev = Event::new(EventKind::SlotChanged, SimTime::ZERO)
            .with_slot(1)
            .with_client(ClientId::new("user1"))
            .with_class(ClientClass::User);
        grid.apply(&ev);
        assert_eq!(
            grid.slot(1),
            Some((ClientId::new("user1"), ClientClass::User))
        );

        grid.apply(
            &Event::new(EventKind::QueueChanged, SimTime::ZERO)
                .with_queue(vec![ClientId::new("user2")]),
        );
        assert_eq!(grid.queue(), vec![ClientId::new("user2")]);

        // Freeing the slot clears the cell.
        grid.apply(&Event::new(EventKind::SlotChanged, SimTime::new(1)).with_slot(1));
        assert_eq!(grid.slot(1), None);
    }

    #[test]
    fn test_stale_event_is_rejected() {
        let grid = GridWriter::new(1, false);
        let fresh = Event::new(EventKind::SlotChanged, SimTime::ZERO)
            .with_slot(0)
            .with_client(ClientId::new("user1"))
            .with_class(ClientClass::User);
        let stale = Event {
            seq: fresh.seq.saturating_sub(1),
            ..Event::new(EventKind::SlotChanged, SimTime::ZERO).with_slot(0)
        };
        grid.apply(&fresh);
        grid.apply(&stale);
        assert_eq!(
            grid.slot(0),
            Some((ClientId::new("user1"), ClientClass::User)),
            "stale free-slot event must not clear the cell"
        );
    }

    #[test]
    fn test_mirror_matches_authoritative_state_after_seeded_run() {
        let cfg = SimConfig {
            seed: Some(77),
            ..SimConfig::default()
        };
        let bus = Bus::new(1 << 16);
        let mut rx = bus.subscribe();
        let mut sim = Simulation::new(&cfg, bus);
        sim.run_until(SimTime::new(60));

        let grid = GridWriter::new(cfg.capacity, false);
        while let Ok(ev) = rx.try_recv() {
            grid.apply(&ev);
        }

        for (index, occupant) in sim.controller().slots().iter() {
            assert_eq!(
                grid.slot(index).map(|(c, _)| c),
                occupant.cloned(),
                "mirror diverged at slot {index}"
            );
        }
        assert_eq!(grid.queue(), sim.controller().wait_queue().contents());
    }

    #[test]
    fn test_render_shows_class_for_admins_and_name_for_users() {
        let grid = GridWriter::new(2, false);
        grid.apply(
            &Event::new(EventKind::SlotChanged, SimTime::ZERO)
                .with_slot(0)
                .with_client(ClientId::new("admin1"))
                .with_class(ClientClass::Admin),
        );
        let rendered = grid.render();
        assert!(rendered.contains("Port  1: Admin"), "{rendered}");
        assert!(rendered.contains("Port  2: Free"), "{rendered}");
        assert!(rendered.contains("Queue:"), "{rendered}");
    }
}
