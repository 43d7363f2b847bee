//! Presence registry — maps users to their live connections.
//!
//! All mutation happens through the DashMap entry guards, so concurrent
//! register/unregister calls from independent connection tasks never lose
//! updates. Callers broadcast the full online set after every mutation.

use std::collections::HashSet;

use dashmap::DashMap;

use chathub_core::types::id::UserId;

use crate::connection::handle::ConnectionId;

/// Tracks which users currently have at least one live connection.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    /// User ID → live connection ids.
    online: DashMap<UserId, HashSet<ConnectionId>>,
}

impl PresenceRegistry {
    /// Creates a new empty presence registry.
    pub fn new() -> Self {
        Self {
            online: DashMap::new(),
        }
    }

    /// Registers a connection for a user.
    ///
    /// Returns `true` if the user was offline before this call.
    pub fn register(&self, user_id: UserId, conn_id: ConnectionId) -> bool {
        let mut entry = self.online.entry(user_id).or_default();
        let newly_online = entry.is_empty();
        entry.insert(conn_id);
        newly_online
    }

    /// Removes a connection for a user.
    ///
    /// Returns `true` if this was the user's last connection, i.e. the
    /// user just went offline. Unknown connections are ignored.
    pub fn unregister(&self, user_id: &UserId, conn_id: &ConnectionId) -> bool {
        let removed = match self.online.get_mut(user_id) {
            Some(mut conns) => conns.remove(conn_id),
            None => false,
        };
        if !removed {
            return false;
        }
        self.online
            .remove_if(user_id, |_, conns| conns.is_empty())
            .is_some()
    }

    /// Whether the user has at least one live connection.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.online
            .get(user_id)
            .map(|conns| !conns.is_empty())
            .unwrap_or(false)
    }

    /// Snapshot of every online user id.
    pub fn online_users(&self) -> Vec<UserId> {
        self.online.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of online users.
    pub fn online_count(&self) -> usize {
        self.online.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn test_register_and_unregister() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();
        let conn = Uuid::new_v4();

        assert!(registry.register(user, conn));
        assert!(registry.is_online(&user));

        assert!(registry.unregister(&user, &conn));
        assert!(!registry.is_online(&user));
        assert!(registry.online_users().is_empty());
    }

    #[test]
    fn test_user_stays_online_until_last_connection_closes() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(registry.register(user, first));
        // Second connection does not change online status.
        assert!(!registry.register(user, second));

        assert!(!registry.unregister(&user, &first));
        assert!(registry.is_online(&user));

        assert!(registry.unregister(&user, &second));
        assert!(!registry.is_online(&user));
    }

    #[test]
    fn test_unregister_unknown_connection_is_noop() {
        let registry = PresenceRegistry::new();
        let user = UserId::new();
        registry.register(user, Uuid::new_v4());

        assert!(!registry.unregister(&user, &Uuid::new_v4()));
        assert!(registry.is_online(&user));
    }

    #[tokio::test]
    async fn test_concurrent_register_unregister_leaves_no_leaks() {
        let registry = Arc::new(PresenceRegistry::new());
        let user = UserId::new();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let conn = Uuid::new_v4();
                registry.register(user, conn);
                tokio::task::yield_now().await;
                registry.unregister(&user, &conn);
            }));
        }
        for task in tasks {
            task.await.expect("task panicked");
        }

        assert!(!registry.is_online(&user));
        assert_eq!(registry.online_count(), 0);
    }
}
