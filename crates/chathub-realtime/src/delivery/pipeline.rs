//! Message send pipeline.
//!
//! Persists a new message, derives its initial delivery status from
//! presence, advances the conversation's latest-message pointer, and
//! produces the envelopes that fan the message out to the room.

use std::sync::Arc;

use tracing::debug;

use chathub_core::result::AppResult;
use chathub_core::types::id::{ConversationId, UserId};
use chathub_core::AppError;
use chathub_entity::gateway::{ConversationStore, IdentityProvider, MessageStore};
use chathub_entity::message::{Message, MessageStatus};

use crate::event::envelope::Envelope;
use crate::event::types::{MessageView, OutboundEvent};
use crate::presence::registry::PresenceRegistry;

/// Coordinates the persistence and fan-out of new messages.
pub struct DeliveryPipeline {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    identities: Arc<dyn IdentityProvider>,
    presence: Arc<PresenceRegistry>,
}

impl std::fmt::Debug for DeliveryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryPipeline").finish()
    }
}

impl DeliveryPipeline {
    /// Creates a new delivery pipeline.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        identities: Arc<dyn IdentityProvider>,
        presence: Arc<PresenceRegistry>,
    ) -> Self {
        Self {
            conversations,
            messages,
            identities,
            presence,
        }
    }

    /// Accepts a new message from a sender.
    ///
    /// The initial status is `Delivered` when at least one other
    /// participant is online, `Sent` otherwise. Returns the envelopes to
    /// dispatch: `newMessage` to the room and an `unreadCountUpdate` to
    /// every participant except the sender.
    pub async fn send(
        &self,
        sender_id: UserId,
        conversation_id: ConversationId,
        text: Option<String>,
        image: Option<String>,
    ) -> AppResult<(Message, Vec<Envelope>)> {
        let conversation = self
            .conversations
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Conversation not found: {conversation_id}"))
            })?;

        if !conversation.is_participant(&sender_id) {
            return Err(AppError::authorization(
                "Sender is not a participant of this conversation",
            ));
        }

        let status = if conversation
            .other_participants(&sender_id)
            .iter()
            .any(|p| self.presence.is_online(p))
        {
            MessageStatus::Delivered
        } else {
            MessageStatus::Sent
        };

        let message = Message::new(conversation_id, sender_id, text, image, status)?;
        let message = self.messages.create(&message).await?;
        self.conversations
            .set_latest_message(&conversation_id, message.id)
            .await?;

        debug!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            status = %message.status,
            "Message persisted"
        );

        let mut envelopes = Vec::new();
        for participant in conversation.other_participants(&sender_id) {
            let unread_count = self
                .messages
                .count_unread(&conversation_id, &participant)
                .await?;
            envelopes.push(Envelope::to_user(
                participant,
                OutboundEvent::UnreadCountUpdate {
                    conversation_id,
                    unread_count,
                },
            ));
        }

        let sender = self.identities.find(&sender_id).await?;
        envelopes.push(Envelope::to_room(
            conversation_id,
            OutboundEvent::NewMessage {
                message: MessageView::populate(message.clone(), sender.as_ref()),
            },
        ));

        Ok((message, envelopes))
    }
}
