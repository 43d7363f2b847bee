//! Conversation entity model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chathub_core::types::id::{ConversationId, MessageId, UserId};
use chathub_core::{AppError, AppResult};

/// A conversation between two or more users.
///
/// Direct conversations have exactly two participants and no group
/// metadata; group conversations carry a name, an optional icon, and an
/// admin, and have at least three participants including the admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Whether this is a group conversation.
    pub is_group: bool,
    /// Participant user ids. Never empty.
    pub participants: HashSet<UserId>,
    /// Group name (group conversations only).
    pub group_name: Option<String>,
    /// Group icon reference (group conversations only).
    pub group_icon: Option<String>,
    /// Group admin (group conversations only).
    pub group_admin: Option<UserId>,
    /// The most recently sent message, if any.
    pub latest_message: Option<MessageId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (bumped when the latest message changes).
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a direct (1:1) conversation between two distinct users.
    pub fn direct(a: UserId, b: UserId) -> AppResult<Self> {
        if a == b {
            return Err(AppError::validation(
                "A direct conversation requires two distinct participants",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: ConversationId::new(),
            is_group: false,
            participants: HashSet::from([a, b]),
            group_name: None,
            group_icon: None,
            group_admin: None,
            latest_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a group conversation. The admin is always a participant, and
    /// at least two other members are required.
    pub fn group(
        name: impl Into<String>,
        admin: UserId,
        members: impl IntoIterator<Item = UserId>,
    ) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::validation("Group name must not be empty"));
        }

        let mut participants: HashSet<UserId> = members.into_iter().collect();
        participants.insert(admin);
        if participants.len() < 3 {
            return Err(AppError::validation(
                "A group conversation requires at least two members besides the admin",
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: ConversationId::new(),
            is_group: true,
            participants,
            group_name: Some(name),
            group_icon: None,
            group_admin: Some(admin),
            latest_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the given user belongs to this conversation.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// All participants except the given user.
    pub fn other_participants(&self, user_id: &UserId) -> Vec<UserId> {
        self.participants
            .iter()
            .filter(|p| *p != user_id)
            .copied()
            .collect()
    }
}
