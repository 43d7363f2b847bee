//! The chat engine: owns every realtime subsystem and dispatches envelopes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use chathub_core::config::realtime::RealtimeConfig;
use chathub_core::result::AppResult;
use chathub_core::AppError;
use chathub_entity::gateway::{ConversationStore, IdentityProvider, MessageStore};

use crate::connection::gateway::ConnectionGateway;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::delivery::pipeline::DeliveryPipeline;
use crate::delivery::receipts::ReadReceipts;
use crate::delivery::typing::TypingNotifier;
use crate::event::envelope::{Envelope, Target};
use crate::event::types::{InboundEvent, OutboundEvent};
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;

/// Coordinates connections, presence, rooms, and message delivery.
///
/// The transport layer calls [`ChatEngine::connect`] once per socket, then
/// feeds inbound frames through [`ChatEngine::handle_raw`] and calls
/// [`ChatEngine::disconnect`] when the socket closes. Everything else is
/// internal: subsystems return envelopes and the engine resolves them
/// against the connection pool and room registry.
pub struct ChatEngine {
    pool: Arc<ConnectionPool>,
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomRegistry>,
    gateway: ConnectionGateway,
    pipeline: DeliveryPipeline,
    receipts: ReadReceipts,
    typing: TypingNotifier,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("connections", &self.pool.connection_count())
            .field("online_users", &self.presence.online_count())
            .finish()
    }
}

impl ChatEngine {
    /// Builds an engine on top of the given stores and identity provider.
    pub fn new(
        config: RealtimeConfig,
        identities: Arc<dyn IdentityProvider>,
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());

        let gateway = ConnectionGateway::new(
            config,
            identities.clone(),
            conversations.clone(),
            pool.clone(),
            presence.clone(),
            rooms.clone(),
        );
        let pipeline = DeliveryPipeline::new(
            conversations.clone(),
            messages.clone(),
            identities,
            presence.clone(),
        );
        let receipts = ReadReceipts::new(conversations, messages);
        let typing = TypingNotifier::new(rooms.clone());

        Self {
            pool,
            presence,
            rooms,
            gateway,
            pipeline,
            receipts,
            typing,
        }
    }

    /// Registers a new connection for the given token.
    ///
    /// On success the setup envelopes (setup-complete, online snapshot)
    /// have already been dispatched; the caller owns the returned receiver
    /// and forwards its events onto the wire.
    pub async fn connect(
        &self,
        token: &str,
    ) -> AppResult<(Arc<ConnectionHandle>, mpsc::Receiver<OutboundEvent>)> {
        let (handle, rx, envelopes) = self.gateway.setup(token).await?;
        self.dispatch(envelopes);
        Ok((handle, rx))
    }

    /// Tears a connection down and broadcasts the updated online set.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let envelopes = self.gateway.teardown(conn_id);
        self.dispatch(envelopes);
    }

    /// Parses and handles one inbound frame from a connection.
    ///
    /// Malformed frames and handler failures never tear the connection
    /// down; they produce a scoped error event on that connection only.
    pub async fn handle_raw(&self, conn: &ConnectionHandle, raw: &str) {
        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(err) => {
                warn!(conn_id = %conn.id, error = %err, "Malformed inbound frame");
                conn.send(OutboundEvent::Error {
                    code: "MALFORMED".to_string(),
                    message: format!("Malformed event: {err}"),
                });
                return;
            }
        };
        self.handle_event(conn, event).await;
    }

    /// Handles one decoded inbound event from a connection.
    pub async fn handle_event(&self, conn: &ConnectionHandle, event: InboundEvent) {
        if let Err(err) = self.route(conn, event).await {
            debug!(conn_id = %conn.id, error = %err, "Inbound event rejected");
            conn.send(OutboundEvent::Error {
                code: err.kind.to_string(),
                message: err.message,
            });
        }
    }

    async fn route(&self, conn: &ConnectionHandle, event: InboundEvent) -> AppResult<()> {
        match event {
            InboundEvent::SendMessage {
                sender_id,
                conversation_id,
                text,
                image,
            } => {
                self.verify_identity(conn, &sender_id)?;
                let (_, envelopes) = self
                    .pipeline
                    .send(sender_id, conversation_id, text, image)
                    .await?;
                self.dispatch(envelopes);
            }
            InboundEvent::MarkAsRead {
                conversation_id,
                user_id,
            } => {
                self.verify_identity(conn, &user_id)?;
                let envelopes = self.receipts.mark_read(user_id, conversation_id).await?;
                self.dispatch(envelopes);
            }
            InboundEvent::MessageDelivered { message_id } => {
                let envelopes = self
                    .receipts
                    .mark_delivered(conn.user_id, message_id)
                    .await?;
                self.dispatch(envelopes);
            }
            InboundEvent::StartTyping { conversation_id } => {
                self.dispatch(self.typing.started(conn.id, conversation_id));
            }
            InboundEvent::StopTyping { conversation_id } => {
                self.dispatch(self.typing.stopped(conn.id, conversation_id));
            }
        }
        Ok(())
    }

    /// Re-derives a connection's room memberships, e.g. after the user was
    /// added to a new conversation.
    pub async fn refresh_rooms(&self, conn_id: &ConnectionId) -> AppResult<()> {
        self.gateway.rejoin_rooms(conn_id).await
    }

    /// Resolves each envelope's target and queues the event on every
    /// matching live connection.
    pub fn dispatch(&self, envelopes: Vec<Envelope>) {
        for envelope in envelopes {
            match envelope.target {
                Target::Connection(conn_id) => {
                    if let Some(conn) = self.pool.get(&conn_id) {
                        conn.send(envelope.event);
                    }
                }
                Target::User(user_id) => {
                    for conn in self.pool.get_user_connections(&user_id) {
                        conn.send(envelope.event.clone());
                    }
                }
                Target::Room {
                    conversation_id,
                    exclude,
                } => {
                    for member in self.rooms.members(&conversation_id) {
                        if Some(member) == exclude {
                            continue;
                        }
                        if let Some(conn) = self.pool.get(&member) {
                            conn.send(envelope.event.clone());
                        }
                    }
                }
                Target::Everyone => {
                    for conn in self.pool.all_connections() {
                        conn.send(envelope.event.clone());
                    }
                }
            }
        }
    }

    /// Presence registry, for surface endpoints that report the online set.
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// Connection pool, for surface endpoints that report connection counts.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn verify_identity(&self, conn: &ConnectionHandle, claimed: &chathub_core::types::id::UserId) -> AppResult<()> {
        if conn.user_id != *claimed {
            return Err(AppError::authorization(
                "Event user does not match the authenticated connection",
            ));
        }
        Ok(())
    }
}
