//! Message entity model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chathub_core::types::id::{ConversationId, MessageId, UserId};
use chathub_core::{AppError, AppResult};

use super::status::MessageStatus;

/// A chat message.
///
/// `read_by` is grow-only and always contains the sender; a message counts
/// as read by its author from the moment it is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// The author.
    pub sender_id: UserId,
    /// Text body, if any.
    pub text: Option<String>,
    /// Image reference, if any.
    pub image: Option<String>,
    /// Delivery status (monotonic).
    pub status: MessageStatus,
    /// Users who have acknowledged the message.
    pub read_by: HashSet<UserId>,
    /// Creation timestamp; messages in a conversation are ordered by it.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message with the given initial status.
    ///
    /// At least one of `text` or `image` must be non-empty.
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        text: Option<String>,
        image: Option<String>,
        status: MessageStatus,
    ) -> AppResult<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        let image = image.filter(|i| !i.trim().is_empty());
        if text.is_none() && image.is_none() {
            return Err(AppError::validation(
                "A message requires a text body or an image",
            ));
        }

        Ok(Self {
            id: MessageId::new(),
            conversation_id,
            sender_id,
            text,
            image,
            status,
            read_by: HashSet::from([sender_id]),
            created_at: Utc::now(),
        })
    }

    /// Whether the given user has read this message.
    pub fn is_read_by(&self, user_id: &UserId) -> bool {
        self.read_by.contains(user_id)
    }

    /// Record a read acknowledgment. Returns `true` if the read-set grew.
    pub fn mark_read_by(&mut self, user_id: UserId) -> bool {
        self.read_by.insert(user_id)
    }

    /// Whether every participant in the given set has read this message.
    pub fn seen_by_all<'a>(&self, participants: impl IntoIterator<Item = &'a UserId>) -> bool {
        participants.into_iter().all(|p| self.read_by.contains(p))
    }
}
