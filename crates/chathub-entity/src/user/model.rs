//! User entity model.
//!
//! Users are owned by the external identity provider; this core only reads
//! them to resolve connections and populate sender display fields.

use serde::{Deserialize, Serialize};

use chathub_core::types::id::UserId;

/// A chat user as seen by the delivery core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name shown next to messages.
    pub display_name: String,
    /// Avatar image reference, if any.
    pub avatar_url: Option<String>,
}

impl User {
    /// Create a user with a fresh identifier.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            display_name: display_name.into(),
            avatar_url: None,
        }
    }
}
