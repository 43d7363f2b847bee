//! Individual connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use chathub_core::types::id::UserId;

use crate::event::types::OutboundEvent;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single live connection.
///
/// Holds the sender half of the connection's outbound event queue, plus
/// metadata about the connected user. The transport task owns the
/// receiving half and forwards events onto the wire.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: UserId,
    /// Display name (cached from setup).
    pub display_name: String,
    /// Sender for outbound events; dropped on close so the transport's
    /// receiver sees the queue end.
    sender: Mutex<Option<mpsc::Sender<OutboundEvent>>>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(user_id: UserId, display_name: String, sender: mpsc::Sender<OutboundEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            display_name,
            sender: Mutex::new(Some(sender)),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue an outbound event for this connection.
    ///
    /// Never blocks: a full buffer drops the event, a closed receiver
    /// marks the connection dead. Returns whether the event was queued.
    pub fn send(&self, event: OutboundEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        let sender = {
            let Ok(guard) = self.sender.lock() else {
                return false;
            };
            match guard.as_ref() {
                Some(sender) => sender.clone(),
                None => return false,
            }
        };
        match sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as closed; further sends are dropped and the
    /// outbound queue is closed after any already-queued events.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
    }
}
