//! # chathub-store
//!
//! In-memory implementations of the ChatHub gateway seams: a persistence
//! gateway for conversations and messages, and a static identity provider.
//! State lives in `DashMap` tables, so all operations are safe under
//! concurrent access from independent connection tasks.

pub mod identity;
pub mod memory;

pub use identity::StaticIdentityProvider;
pub use memory::{MemoryConversationStore, MemoryMessageStore};
