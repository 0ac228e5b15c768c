//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints lifecycle events to stdout in a human-readable
//! format. It skips the two rendering kinds (`SlotChanged`, `QueueChanged`)
//! — those are the grid's business; this writer narrates *why* the state
//! changed.
//!
//! ## Output format
//! ```text
//! [connect] t0 client=user5 class=user slot=4
//! [queued] t12 client=user5
//! [evicted] t0 client=user9 slot=8
//! [disconnect] t14 client=admin2 class=admin slot=23
//! [recovered] t14 admin=admin4
//! [dropped] t31 client=admin3 reason="pool saturated with admins, no eviction candidate"
//! [tick] t13 batch=4
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics
/// collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ClientConnected => {
                if let (Some(client), Some(class), Some(slot)) = (&e.client, e.class, e.slot) {
                    println!(
                        "[connect] {} client={client} class={} slot={slot}",
                        e.at,
                        class.as_label()
                    );
                }
            }
            EventKind::ClientDisconnected => {
                if let (Some(client), Some(class), Some(slot)) = (&e.client, e.class, e.slot) {
                    println!(
                        "[disconnect] {} client={client} class={} slot={slot}",
                        e.at,
                        class.as_label()
                    );
                }
            }
            EventKind::ClientQueued => {
                if let Some(client) = &e.client {
                    println!("[queued] {} client={client}", e.at);
                }
            }
            EventKind::ClientEvicted => {
                if let (Some(client), Some(slot)) = (&e.client, e.slot) {
                    println!("[evicted] {} client={client} slot={slot}", e.at);
                }
            }
            EventKind::AdminRecovered => {
                if let Some(client) = &e.client {
                    println!("[recovered] {} admin={client}", e.at);
                }
            }
            EventKind::ConnectDropped => {
                println!(
                    "[dropped] {} client={:?} reason={:?}",
                    e.at, e.client, e.reason
                );
            }
            EventKind::TickFired => {
                println!("[tick] {} batch={:?}", e.at, e.count);
            }
            EventKind::HorizonReached => {
                println!("[horizon] {}", e.at);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::SlotChanged | EventKind::QueueChanged => {}
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
