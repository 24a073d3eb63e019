use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Actor, NewUser, User, UserCredentials, UserLookup, UserUpdate};
use crate::error::Result;

/// User rows and their credentials.
///
/// Lookups return `Ok(None)` for a missing row; the services decide how that
/// surfaces. Writes that match no row return `NotFound`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// User projection plus the stored password hash, in a single read.
    async fn find_credentials(
        &self,
        lookup: &UserLookup,
    ) -> Result<Option<UserCredentials>>;

    async fn find_group_id(&self, user_id: Uuid) -> Result<Option<Uuid>>;

    async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
        actor: Actor,
    ) -> Result<User>;
    async fn update(&self, update: &UserUpdate, actor: Actor) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        actor: Actor,
    ) -> Result<()>;
}
