//! # chathub-entity
//!
//! Domain entity models for ChatHub, plus the gateway trait seams the
//! real-time engine consumes. Every struct in this crate represents a
//! persisted record or a domain value object. All entities derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`.

pub mod conversation;
pub mod gateway;
pub mod message;
pub mod user;

pub use conversation::Conversation;
pub use gateway::{ConversationStore, IdentityProvider, MessageStore};
pub use message::{Message, MessageStatus};
pub use user::User;
