//! Subscription tracking — which connections are joined to which rooms.

use std::collections::HashSet;

use dashmap::DashMap;

use chathub_core::types::id::ConversationId;

use crate::connection::handle::ConnectionId;

/// Tracks connection-to-room membership (reverse index).
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    /// Connection ID → set of joined conversation rooms.
    conn_to_rooms: DashMap<ConnectionId, HashSet<ConversationId>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self {
            conn_to_rooms: DashMap::new(),
        }
    }

    /// Records a room membership.
    pub fn add(&self, conn_id: ConnectionId, conversation_id: ConversationId) {
        self.conn_to_rooms
            .entry(conn_id)
            .or_default()
            .insert(conversation_id);
    }

    /// Gets all rooms a connection is joined to.
    pub fn rooms(&self, conn_id: ConnectionId) -> HashSet<ConversationId> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns the number of rooms a connection is joined to.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all memberships for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<ConversationId> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
