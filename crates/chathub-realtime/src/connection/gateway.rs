//! Connection gateway — authenticated setup and synchronous teardown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use chathub_core::config::realtime::RealtimeConfig;
use chathub_core::result::AppResult;
use chathub_entity::gateway::{ConversationStore, IdentityProvider};

use crate::event::envelope::Envelope;
use crate::event::types::OutboundEvent;
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;

use super::handle::{ConnectionHandle, ConnectionId};
use super::pool::ConnectionPool;

/// Handles connection setup and teardown.
///
/// Setup authenticates the supplied token, registers presence, and joins
/// the connection to every conversation room the user participates in.
/// Teardown removes the connection from all shared registries before it
/// returns, so no later broadcast targets a dead connection.
pub struct ConnectionGateway {
    /// Identity provider.
    identities: Arc<dyn IdentityProvider>,
    /// Conversation store, for deriving room membership.
    conversations: Arc<dyn ConversationStore>,
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Presence registry.
    presence: Arc<PresenceRegistry>,
    /// Room registry.
    rooms: Arc<RoomRegistry>,
    /// Configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGateway").finish()
    }
}

impl ConnectionGateway {
    /// Creates a new connection gateway.
    pub fn new(
        config: RealtimeConfig,
        identities: Arc<dyn IdentityProvider>,
        conversations: Arc<dyn ConversationStore>,
        pool: Arc<ConnectionPool>,
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            identities,
            conversations,
            pool,
            presence,
            rooms,
            config,
        }
    }

    /// Authenticates and registers a new connection.
    ///
    /// Returns the connection handle, the receiver for its outbound event
    /// queue, and the envelopes the caller must dispatch (setup-complete
    /// to the connection, the online snapshot to everyone).
    pub async fn setup(
        &self,
        token: &str,
    ) -> AppResult<(
        Arc<ConnectionHandle>,
        mpsc::Receiver<OutboundEvent>,
        Vec<Envelope>,
    )> {
        let user = self.identities.authenticate(token).await?;

        // Derive room membership before touching any registry, so a
        // persistence failure leaves no trace of the connection.
        let conversations = self.conversations.find_by_participant(&user.id).await?;

        let mut envelopes = Vec::new();

        // Enforce max connections per user by evicting the oldest. The
        // evicted connection is told why and its queue is closed, so its
        // transport task shuts the socket down.
        let existing = self.pool.get_user_connections(&user.id);
        if existing.len() >= self.config.max_connections_per_user {
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user.id,
                    count = existing.len(),
                    max = self.config.max_connections_per_user,
                    "User at max connections, evicting oldest"
                );
                oldest.send(OutboundEvent::Error {
                    code: "CONNECTION_REPLACED".to_string(),
                    message: "Connection limit reached; replaced by a newer connection"
                        .to_string(),
                });
                envelopes.extend(self.teardown(&oldest.id));
            }
        }

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(
            user.id,
            user.display_name.clone(),
            tx,
        ));

        self.pool.add(handle.clone());
        self.presence.register(user.id, handle.id);
        for conversation in &conversations {
            self.rooms.join(handle.id, conversation.id);
        }

        info!(
            conn_id = %handle.id,
            user_id = %user.id,
            rooms = conversations.len(),
            "Connection registered"
        );

        envelopes.push(Envelope::to_connection(
            handle.id,
            OutboundEvent::SetupComplete,
        ));
        envelopes.push(Envelope::to_everyone(OutboundEvent::OnlineUsers {
            users: self.presence.online_users(),
        }));

        Ok((handle, rx, envelopes))
    }

    /// Unregisters a connection from every shared registry.
    ///
    /// Completes synchronously; in-flight operations the connection already
    /// started are unaffected. Returns the envelopes to dispatch (a fresh
    /// online snapshot after every presence mutation).
    pub fn teardown(&self, conn_id: &ConnectionId) -> Vec<Envelope> {
        let Some(handle) = self.pool.remove(conn_id) else {
            return Vec::new();
        };
        handle.mark_closed();
        self.rooms.leave_all(*conn_id);

        let went_offline = self.presence.unregister(&handle.user_id, conn_id);

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            went_offline,
            "Connection unregistered"
        );

        vec![Envelope::to_everyone(OutboundEvent::OnlineUsers {
            users: self.presence.online_users(),
        })]
    }

    /// Re-derives room membership for a live connection.
    ///
    /// Idempotent and callable at any time, e.g. after the user was added
    /// to a newly created conversation.
    pub async fn rejoin_rooms(&self, conn_id: &ConnectionId) -> AppResult<()> {
        let Some(handle) = self.pool.get(conn_id) else {
            return Ok(());
        };
        self.join_user_rooms(&handle).await
    }

    async fn join_user_rooms(&self, handle: &ConnectionHandle) -> AppResult<()> {
        let conversations = self.conversations.find_by_participant(&handle.user_id).await?;
        for conversation in &conversations {
            self.rooms.join(handle.id, conversation.id);
        }
        Ok(())
    }
}
