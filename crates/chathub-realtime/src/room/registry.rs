//! Room registry — manages per-conversation broadcast membership.

use std::collections::HashSet;

use dashmap::DashMap;

use chathub_core::types::id::ConversationId;

use crate::connection::handle::ConnectionId;

use super::subscription::SubscriptionTracker;

/// Registry of all conversation rooms.
///
/// Membership is derived from conversation participant lists at connection
/// setup and re-derived on demand; `join` is idempotent so re-deriving at
/// any time is safe.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Conversation ID → member connection ids.
    rooms: DashMap<ConversationId, HashSet<ConnectionId>>,
    /// Reverse index for teardown.
    subscriptions: SubscriptionTracker,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            subscriptions: SubscriptionTracker::new(),
        }
    }

    /// Joins a connection to a conversation's room. Idempotent.
    pub fn join(&self, conn_id: ConnectionId, conversation_id: ConversationId) {
        self.rooms
            .entry(conversation_id)
            .or_default()
            .insert(conn_id);
        self.subscriptions.add(conn_id, conversation_id);
    }

    /// Removes a connection from every room it is joined to.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        let rooms = self.subscriptions.remove_all(conn_id);
        for conversation_id in &rooms {
            if let Some(mut members) = self.rooms.get_mut(conversation_id) {
                members.remove(&conn_id);
            }
            self.rooms
                .remove_if(conversation_id, |_, members| members.is_empty());
        }
    }

    /// Returns all member connection ids of a room.
    pub fn members(&self, conversation_id: &ConversationId) -> Vec<ConnectionId> {
        self.rooms
            .get(conversation_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is joined to a room.
    pub fn is_member(&self, conn_id: ConnectionId, conversation_id: &ConversationId) -> bool {
        self.rooms
            .get(conversation_id)
            .map(|members| members.contains(&conn_id))
            .unwrap_or(false)
    }

    /// Returns the number of rooms a connection is joined to.
    pub fn room_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Returns total number of active rooms.
    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }
}
