//! Identity provider trait.

use async_trait::async_trait;

use chathub_core::result::AppResult;
use chathub_core::types::id::UserId;

use crate::user::User;

/// Resolves opaque connection tokens to users.
///
/// Implementations must reject tokens that are empty, do not match the
/// provider's id shape, or resolve to no known user with an
/// `Authentication` error.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Authenticate a connection token and return the user it belongs to.
    async fn authenticate(&self, token: &str) -> AppResult<User>;

    /// Look up a user by id (used to populate sender display fields).
    async fn find(&self, user_id: &UserId) -> AppResult<Option<User>>;
}
