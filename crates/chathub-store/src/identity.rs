//! Static identity provider.
//!
//! Connection tokens are the user's UUID in string form. A token is
//! rejected before any registration if it is empty, does not parse as a
//! UUID, or resolves to no known user.

use dashmap::DashMap;

use async_trait::async_trait;

use chathub_core::result::AppResult;
use chathub_core::types::id::UserId;
use chathub_core::AppError;
use chathub_entity::gateway::IdentityProvider;
use chathub_entity::user::User;

/// Identity provider backed by an in-memory user directory.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    /// User ID → user record.
    users: DashMap<UserId, User>,
}

impl StaticIdentityProvider {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Register a user in the directory.
    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, token: &str) -> AppResult<User> {
        if token.trim().is_empty() {
            return Err(AppError::authentication("Missing user identifier"));
        }

        let user_id: UserId = token
            .parse()
            .map_err(|_| AppError::authentication(format!("Invalid user identifier: '{token}'")))?;

        self.users
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::authentication(format!("Unknown user: {user_id}")))
    }

    async fn find(&self, user_id: &UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }
}
