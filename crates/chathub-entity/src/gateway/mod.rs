//! Trait seams over the externally supplied collaborators.
//!
//! The delivery core never talks to a concrete database or identity
//! backend; it consumes these traits. `chathub-store` provides in-memory
//! implementations used by the server binary and the test suite.

pub mod identity;
pub mod persistence;

pub use identity::IdentityProvider;
pub use persistence::{ConversationStore, MessageStore};
