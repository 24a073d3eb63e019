use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::AuthCrypto;
use crate::database::ports::{AccessRepository, UsersRepository};
use crate::domain::{User, UserCredentials, UserLookup};
use crate::error::{Result, UserError};

/// Checks a supplied password against the stored Argon2 hash.
///
/// An unknown account and a wrong password fail identically with
/// `NotFound`, so callers cannot tell which accounts exist.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UsersRepository>,
    access: Arc<dyn AccessRepository>,
    crypto: Arc<AuthCrypto>,
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("users_refs", &Arc::strong_count(&self.users))
            .field("access_refs", &Arc::strong_count(&self.access))
            .finish()
    }
}

impl CredentialVerifier {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        access: Arc<dyn AccessRepository>,
        crypto: Arc<AuthCrypto>,
    ) -> Self {
        Self {
            users,
            access,
            crypto,
        }
    }

    /// Verify `password` for the account identified by `lookup` and return
    /// the user with its group and access grants populated.
    pub async fn verify_password(&self, lookup: &UserLookup, password: &str) -> Result<User> {
        let Some(UserCredentials {
            mut user,
            password_hash,
        }) = self.users.find_credentials(lookup).await?
        else {
            // Pay the same hashing cost as a real mismatch.
            let dummy_hash = self.crypto.dummy_hash().to_owned();
            let _ = super::verify_password(&self.crypto, password, dummy_hash).await?;
            debug!(lookup = %lookup, "no account for login");
            return Err(invalid_credentials());
        };

        match super::verify_password(&self.crypto, password, password_hash).await? {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %user.id, "password mismatch");
                return Err(invalid_credentials());
            }
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "stored password hash is unreadable");
                return Err(invalid_credentials());
            }
        }

        user.group.access = self.access.find_group_access(user.group.id).await?;
        Ok(user)
    }

    /// Verify by login handle: an email when it contains `@`, otherwise a
    /// username.
    pub async fn login(&self, login: &str, password: &str) -> Result<User> {
        self.verify_password(&UserLookup::from_login(login), password)
            .await
    }
}

fn invalid_credentials() -> UserError {
    UserError::NotFound("Invalid credentials".to_string())
}
