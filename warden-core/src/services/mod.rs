//! Application services built on the repository ports.

pub mod access_checker;
pub mod credential_verifier;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use access_checker::AccessChecker;
pub use credential_verifier::CredentialVerifier;
pub use user_service::UserService;

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::auth::AuthCrypto;
use crate::error::{Result, UserError};

// Argon2 is deliberately slow; keep it off the async workers.

async fn hash_password(crypto: &Arc<AuthCrypto>, password: &str) -> Result<String> {
    let crypto = Arc::clone(crypto);
    let password = Zeroizing::new(password.to_owned());

    tokio::task::spawn_blocking(move || crypto.hash_password(&password))
        .await
        .map_err(|e| UserError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(UserError::from)
}

async fn verify_password(
    crypto: &Arc<AuthCrypto>,
    password: &str,
    password_hash: String,
) -> Result<std::result::Result<bool, crate::auth::AuthCryptoError>> {
    let crypto = Arc::clone(crypto);
    let password = Zeroizing::new(password.to_owned());

    tokio::task::spawn_blocking(move || crypto.verify_password(&password, &password_hash))
        .await
        .map_err(|e| {
            UserError::Internal(format!("Password verification task failed: {}", e))
        })
}
