//! Sequence-number guard for request slots
//!
//! Every call issued into a slot takes a [`Ticket`]. Only the holder of the
//! most recent ticket may apply its outcome to visible state; starting a new
//! call also cancels the previous call's token, which stops the transport on
//! a best-effort basis.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A logical target whose state only the latest call may write
#[derive(Debug)]
pub struct Slot {
    name: &'static str,
    sequence: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
}

/// Proof of issuance for one call
#[derive(Debug, Clone)]
pub struct Ticket {
    sequence: u64,
    token: CancellationToken,
}

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Cancellation token handed to the gateway
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Slot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            sequence: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Issue a ticket for a new call, superseding any earlier one
    pub fn begin(&self) -> Ticket {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous.filter(|token| !token.is_cancelled()) {
            debug!("Slot '{}': call #{} supersedes in-flight call", self.name, sequence);
            previous.cancel();
        }

        Ticket { sequence, token }
    }

    /// Whether `ticket` belongs to the most recently issued call
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket.sequence
    }

    /// Sequence number of the latest call
    pub fn latest(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}
