//! Ephemeral typing notifications.
//!
//! Typing state is never persisted; a notification is forwarded to the
//! room and forgotten. The sender's own connection is always excluded.

use std::sync::Arc;

use chathub_core::types::id::ConversationId;

use crate::connection::handle::ConnectionId;
use crate::event::envelope::Envelope;
use crate::event::types::OutboundEvent;
use crate::room::registry::RoomRegistry;

/// Forwards typing start/stop events to conversation rooms.
pub struct TypingNotifier {
    rooms: Arc<RoomRegistry>,
}

impl std::fmt::Debug for TypingNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingNotifier").finish()
    }
}

impl TypingNotifier {
    /// Creates a new typing notifier.
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// Notifies a room that a connection's user started typing.
    ///
    /// Connections not joined to the room produce no envelopes.
    pub fn started(
        &self,
        conn_id: ConnectionId,
        conversation_id: ConversationId,
    ) -> Vec<Envelope> {
        self.notify(conn_id, conversation_id, OutboundEvent::Typing { conversation_id })
    }

    /// Notifies a room that a connection's user stopped typing.
    pub fn stopped(
        &self,
        conn_id: ConnectionId,
        conversation_id: ConversationId,
    ) -> Vec<Envelope> {
        self.notify(
            conn_id,
            conversation_id,
            OutboundEvent::StopTyping { conversation_id },
        )
    }

    fn notify(
        &self,
        conn_id: ConnectionId,
        conversation_id: ConversationId,
        event: OutboundEvent,
    ) -> Vec<Envelope> {
        if !self.rooms.is_member(conn_id, &conversation_id) {
            return Vec::new();
        }
        vec![Envelope::to_room_except(conversation_id, conn_id, event)]
    }
}
