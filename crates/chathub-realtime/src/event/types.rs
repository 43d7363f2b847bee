//! Inbound and outbound protocol event type definitions.
//!
//! The wire format is a JSON object with a `type` tag. Event and field
//! names match the connection-level protocol exactly, so a serialized
//! `OutboundEvent::NewMessage` comes out as `{"type": "newMessage", ...}`.

use serde::{Deserialize, Serialize};

use chathub_core::types::id::{ConversationId, MessageId, UserId};
use chathub_entity::message::Message;
use chathub_entity::user::User;

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundEvent {
    /// Send a message to a conversation.
    SendMessage {
        /// The author. Must match the connection's authenticated user.
        sender_id: UserId,
        /// Target conversation.
        conversation_id: ConversationId,
        /// Text body, if any.
        #[serde(default)]
        text: Option<String>,
        /// Image reference, if any.
        #[serde(default)]
        image: Option<String>,
    },
    /// Acknowledge every message in a conversation as read.
    MarkAsRead {
        /// The conversation being read.
        conversation_id: ConversationId,
        /// The reader. Must match the connection's authenticated user.
        user_id: UserId,
    },
    /// Report that a message reached this client.
    MessageDelivered {
        /// The delivered message.
        message_id: MessageId,
    },
    /// The user started typing in a conversation.
    StartTyping {
        /// The conversation being typed in.
        conversation_id: ConversationId,
    },
    /// The user stopped typing in a conversation.
    StopTyping {
        /// The conversation being typed in.
        conversation_id: ConversationId,
    },
}

/// Events sent by the server to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundEvent {
    /// Connection setup finished: presence registered, rooms joined.
    #[serde(rename = "setup-complete")]
    SetupComplete,
    /// Connection setup failed.
    #[serde(rename = "setup-error")]
    SetupError {
        /// Failure description.
        message: String,
    },
    /// A new message was delivered to one of the receiver's rooms.
    NewMessage {
        /// The message with sender display fields resolved.
        message: MessageView,
    },
    /// A user read every message in a conversation.
    MessagesRead {
        /// The conversation that was read.
        conversation_id: ConversationId,
        /// The reader.
        user_id: UserId,
    },
    /// Updated unread count for one conversation.
    UnreadCountUpdate {
        /// The conversation the count applies to.
        conversation_id: ConversationId,
        /// Messages the receiving user has not read.
        unread_count: u64,
    },
    /// A message's delivery status changed.
    MessageStatusUpdated {
        /// The message in its new state.
        message: Message,
    },
    /// Another participant is typing.
    Typing {
        /// The conversation being typed in.
        conversation_id: ConversationId,
    },
    /// Another participant stopped typing.
    StopTyping {
        /// The conversation being typed in.
        conversation_id: ConversationId,
    },
    /// Snapshot of all currently online users.
    #[serde(rename = "online-users")]
    OnlineUsers {
        /// Online user ids.
        users: Vec<UserId>,
    },
    /// A scoped error for the receiving connection only.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

/// A message populated with its sender's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// The message itself.
    #[serde(flatten)]
    pub message: Message,
    /// Sender display name.
    pub sender_name: String,
    /// Sender avatar reference, if any.
    pub sender_avatar: Option<String>,
}

impl MessageView {
    /// Populate a message with the sender's display fields.
    pub fn populate(message: Message, sender: Option<&User>) -> Self {
        Self {
            sender_name: sender
                .map(|u| u.display_name.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            sender_avatar: sender.and_then(|u| u.avatar_url.clone()),
            message,
        }
    }
}
