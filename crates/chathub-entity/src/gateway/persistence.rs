//! Persistence gateway traits for conversations and messages.

use async_trait::async_trait;

use chathub_core::result::AppResult;
use chathub_core::types::id::{ConversationId, MessageId, UserId};

use crate::conversation::Conversation;
use crate::message::{Message, MessageStatus};

/// Durable store for conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync + 'static {
    /// Find a conversation by its primary key.
    async fn find_by_id(&self, id: &ConversationId) -> AppResult<Option<Conversation>>;

    /// Find every conversation the given user participates in.
    async fn find_by_participant(&self, user_id: &UserId) -> AppResult<Vec<Conversation>>;

    /// Find the direct conversation between two users, if one exists.
    async fn find_direct(&self, a: &UserId, b: &UserId) -> AppResult<Option<Conversation>>;

    /// Persist a new conversation and return it.
    ///
    /// For direct conversations the store enforces at most one conversation
    /// per unordered pair of participants.
    async fn create(&self, conversation: &Conversation) -> AppResult<Conversation>;

    /// Point the conversation at its newest message.
    async fn set_latest_message(
        &self,
        id: &ConversationId,
        message_id: MessageId,
    ) -> AppResult<()>;
}

/// Durable store for messages.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Find a message by its primary key.
    async fn find_by_id(&self, id: &MessageId) -> AppResult<Option<Message>>;

    /// All messages of a conversation, in persistence order.
    async fn find_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<Message>>;

    /// Persist a new message and return it.
    async fn create(&self, message: &Message) -> AppResult<Message>;

    /// Count the messages in a conversation the given user has not read.
    async fn count_unread(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> AppResult<u64>;

    /// Add the user to the read-set of every message in the conversation
    /// they have not read yet. Returns how many messages were updated;
    /// calling it again with the same arguments updates nothing.
    async fn add_read_by(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> AppResult<u64>;

    /// Persist a status change for a message. Returns the updated message,
    /// or `None` if the message does not exist.
    async fn set_status(
        &self,
        id: &MessageId,
        status: MessageStatus,
    ) -> AppResult<Option<Message>>;
}
