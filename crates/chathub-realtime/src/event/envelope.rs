//! Targeted outbound envelopes.
//!
//! Subsystems do not push to sockets directly; they return envelopes and
//! the engine resolves each target against the connection pool and room
//! registry. This keeps the delivery pipeline and receipt aggregator
//! testable without a live transport.

use chathub_core::types::id::{ConversationId, UserId};

use crate::connection::handle::ConnectionId;

use super::types::OutboundEvent;

/// Where an outbound event should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single connection.
    Connection(ConnectionId),
    /// Every connection of one user.
    User(UserId),
    /// Every connection joined to a conversation's room.
    Room {
        /// The conversation whose room receives the event.
        conversation_id: ConversationId,
        /// A connection to skip (e.g. the typing sender).
        exclude: Option<ConnectionId>,
    },
    /// Every live connection.
    Everyone,
}

/// An outbound event paired with its delivery target.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Delivery target.
    pub target: Target,
    /// The event payload.
    pub event: OutboundEvent,
}

impl Envelope {
    /// Address an event to a single connection.
    pub fn to_connection(conn_id: ConnectionId, event: OutboundEvent) -> Self {
        Self {
            target: Target::Connection(conn_id),
            event,
        }
    }

    /// Address an event to all of a user's connections.
    pub fn to_user(user_id: UserId, event: OutboundEvent) -> Self {
        Self {
            target: Target::User(user_id),
            event,
        }
    }

    /// Address an event to a conversation's room.
    pub fn to_room(conversation_id: ConversationId, event: OutboundEvent) -> Self {
        Self {
            target: Target::Room {
                conversation_id,
                exclude: None,
            },
            event,
        }
    }

    /// Address an event to a conversation's room, skipping one connection.
    pub fn to_room_except(
        conversation_id: ConversationId,
        exclude: ConnectionId,
        event: OutboundEvent,
    ) -> Self {
        Self {
            target: Target::Room {
                conversation_id,
                exclude: Some(exclude),
            },
            event,
        }
    }

    /// Address an event to every live connection.
    pub fn to_everyone(event: OutboundEvent) -> Self {
        Self {
            target: Target::Everyone,
            event,
        }
    }
}
