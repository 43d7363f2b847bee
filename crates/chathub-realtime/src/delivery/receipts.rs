//! Read-receipt aggregation and delivery acknowledgments.
//!
//! A read acknowledgment covers every message in the conversation at once.
//! After recording it, the conversation is scanned and any message now read
//! by every current participant is promoted to `Seen`. Status promotion is
//! monotonic: `Seen` never regresses, and a late delivery acknowledgment
//! for a seen message is a no-op.

use std::sync::Arc;

use tracing::debug;

use chathub_core::result::AppResult;
use chathub_core::types::id::{ConversationId, MessageId, UserId};
use chathub_core::AppError;
use chathub_entity::gateway::{ConversationStore, MessageStore};
use chathub_entity::message::MessageStatus;

use crate::event::envelope::Envelope;
use crate::event::types::OutboundEvent;

/// Records read and delivery acknowledgments and derives status promotions.
pub struct ReadReceipts {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
}

impl std::fmt::Debug for ReadReceipts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadReceipts").finish()
    }
}

impl ReadReceipts {
    /// Creates a new receipt aggregator.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// Records that a user has read every message in a conversation.
    ///
    /// Idempotent. Returns the envelopes to dispatch: `messagesRead` to the
    /// room and a zeroed `unreadCountUpdate` to the reader's connections.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
    ) -> AppResult<Vec<Envelope>> {
        let conversation = self
            .conversations
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Conversation not found: {conversation_id}"))
            })?;

        if !conversation.is_participant(&user_id) {
            return Err(AppError::authorization(
                "Reader is not a participant of this conversation",
            ));
        }

        let updated = self.messages.add_read_by(&conversation_id, &user_id).await?;
        debug!(
            conversation_id = %conversation_id,
            user_id = %user_id,
            updated,
            "Read acknowledgment recorded"
        );

        // Promote to Seen any message every current participant has read.
        for message in self.messages.find_by_conversation(&conversation_id).await? {
            if message.status == MessageStatus::Seen {
                continue;
            }
            if message.seen_by_all(&conversation.participants) {
                self.messages
                    .set_status(&message.id, MessageStatus::Seen)
                    .await?;
            }
        }

        let unread_count = self.messages.count_unread(&conversation_id, &user_id).await?;
        Ok(vec![
            Envelope::to_room(
                conversation_id,
                OutboundEvent::MessagesRead {
                    conversation_id,
                    user_id,
                },
            ),
            Envelope::to_user(
                user_id,
                OutboundEvent::UnreadCountUpdate {
                    conversation_id,
                    unread_count,
                },
            ),
        ])
    }

    /// Records that a message reached one of its recipients.
    ///
    /// Only participants of the message's conversation may acknowledge.
    /// Promotes `Sent` to `Delivered`; any higher status is left alone.
    /// Returns a `messageStatusUpdated` for the sender when the status
    /// actually changed.
    pub async fn mark_delivered(
        &self,
        user_id: UserId,
        message_id: MessageId,
    ) -> AppResult<Vec<Envelope>> {
        let message = self
            .messages
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message not found: {message_id}")))?;

        let conversation = self
            .conversations
            .find_by_id(&message.conversation_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Conversation not found: {}",
                    message.conversation_id
                ))
            })?;
        if !conversation.is_participant(&user_id) {
            return Err(AppError::authorization(
                "Acknowledging user is not a participant of this conversation",
            ));
        }

        let promoted = message.status.promote(MessageStatus::Delivered);
        if promoted == message.status {
            return Ok(Vec::new());
        }

        let updated = self
            .messages
            .set_status(&message_id, promoted)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message not found: {message_id}")))?;

        Ok(vec![Envelope::to_user(
            updated.sender_id,
            OutboundEvent::MessageStatusUpdated { message: updated },
        )])
    }
}
