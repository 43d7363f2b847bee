//! In-memory persistence gateway backed by DashMap tables.
//!
//! Messages are appended per conversation, so `find_by_conversation`
//! returns them in persistence order. Mutations on a conversation's
//! message list go through a single DashMap entry guard, which keeps
//! concurrent sends to the same conversation serialized.

use chrono::Utc;
use dashmap::DashMap;

use async_trait::async_trait;
use tracing::debug;

use chathub_core::result::AppResult;
use chathub_core::types::id::{ConversationId, MessageId, UserId};
use chathub_core::AppError;
use chathub_entity::conversation::Conversation;
use chathub_entity::gateway::{ConversationStore, MessageStore};
use chathub_entity::message::{Message, MessageStatus};

/// In-memory conversation store.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    /// Conversation ID → conversation.
    conversations: DashMap<ConversationId, Conversation>,
}

impl MemoryConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            conversations: DashMap::new(),
        }
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn find_by_id(&self, id: &ConversationId) -> AppResult<Option<Conversation>> {
        Ok(self.conversations.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_participant(&self, user_id: &UserId) -> AppResult<Vec<Conversation>> {
        Ok(self
            .conversations
            .iter()
            .filter(|entry| entry.value().is_participant(user_id))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_direct(&self, a: &UserId, b: &UserId) -> AppResult<Option<Conversation>> {
        Ok(self
            .conversations
            .iter()
            .find(|entry| {
                let convo = entry.value();
                !convo.is_group && convo.is_participant(a) && convo.is_participant(b)
            })
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, conversation: &Conversation) -> AppResult<Conversation> {
        if !conversation.is_group {
            let mut pair = conversation.participants.iter();
            if let (Some(a), Some(b)) = (pair.next(), pair.next()) {
                if self.find_direct(a, b).await?.is_some() {
                    return Err(AppError::conflict(
                        "A direct conversation between these users already exists",
                    ));
                }
            }
        }

        self.conversations
            .insert(conversation.id, conversation.clone());
        debug!(conversation_id = %conversation.id, is_group = conversation.is_group, "Conversation created");
        Ok(conversation.clone())
    }

    async fn set_latest_message(
        &self,
        id: &ConversationId,
        message_id: MessageId,
    ) -> AppResult<()> {
        let mut convo = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Conversation {id} not found")))?;
        convo.latest_message = Some(message_id);
        convo.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory message store.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    /// Conversation ID → messages in persistence order.
    by_conversation: DashMap<ConversationId, Vec<Message>>,
    /// Message ID → owning conversation, for direct lookups.
    index: DashMap<MessageId, ConversationId>,
}

impl MemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            by_conversation: DashMap::new(),
            index: DashMap::new(),
        }
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn find_by_id(&self, id: &MessageId) -> AppResult<Option<Message>> {
        let Some(conversation_id) = self.index.get(id).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self
            .by_conversation
            .get(&conversation_id)
            .and_then(|msgs| msgs.iter().find(|m| m.id == *id).cloned()))
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<Message>> {
        Ok(self
            .by_conversation
            .get(conversation_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn create(&self, message: &Message) -> AppResult<Message> {
        self.index.insert(message.id, message.conversation_id);
        self.by_conversation
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());
        debug!(message_id = %message.id, conversation_id = %message.conversation_id, "Message persisted");
        Ok(message.clone())
    }

    async fn count_unread(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> AppResult<u64> {
        Ok(self
            .by_conversation
            .get(conversation_id)
            .map(|msgs| msgs.iter().filter(|m| !m.is_read_by(user_id)).count() as u64)
            .unwrap_or(0))
    }

    async fn add_read_by(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> AppResult<u64> {
        let Some(mut msgs) = self.by_conversation.get_mut(conversation_id) else {
            return Ok(0);
        };
        let mut updated = 0u64;
        for msg in msgs.iter_mut() {
            if msg.mark_read_by(*user_id) {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn set_status(
        &self,
        id: &MessageId,
        status: MessageStatus,
    ) -> AppResult<Option<Message>> {
        let Some(conversation_id) = self.index.get(id).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        let Some(mut msgs) = self.by_conversation.get_mut(&conversation_id) else {
            return Ok(None);
        };
        Ok(msgs.iter_mut().find(|m| m.id == *id).map(|msg| {
            msg.status = status;
            msg.clone()
        }))
    }
}
