use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, Salt, SaltString,
    },
};
use rand::{TryRngCore, rngs::OsRng};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id password hashing with a server-side pepper.
///
/// Every hash gets a fresh random salt and the configured cost parameters.
/// Verification reads the parameters back out of the stored PHC string, so
/// raising the cost later does not invalidate existing hashes.
pub struct AuthCrypto {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
    dummy_hash: String,
}

impl fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCrypto")
            .field("argon2", &self.argon2)
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl From<PasswordHashError> for AuthCryptoError {
    fn from(err: PasswordHashError) -> Self {
        AuthCryptoError::PasswordHash(err.to_string())
    }
}

const DUMMY_PASSWORD: &str = "warden-unknown-account";

impl AuthCrypto {
    /// ~64 MiB and 3 passes; a reasonable server baseline.
    pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    pub const DEFAULT_ITERATIONS: u32 = 3;
    pub const DEFAULT_PARALLELISM: u32 = 1;
    const OUTPUT_LENGTH: usize = 32;
    const SALT_LENGTH: usize = Salt::RECOMMENDED_LENGTH;

    /// Build a helper with default Argon2id parameters.
    pub fn new(password_pepper: impl AsRef<[u8]>) -> Result<Self, AuthCryptoError> {
        Self::with_params(
            password_pepper,
            Self::params(
                Self::DEFAULT_MEMORY_KIB,
                Self::DEFAULT_ITERATIONS,
                Self::DEFAULT_PARALLELISM,
            )?,
        )
    }

    /// Build Argon2 parameters from raw cost settings.
    pub fn params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Params, AuthCryptoError> {
        ParamsBuilder::new()
            .m_cost(memory_kib)
            .t_cost(iterations)
            .p_cost(parallelism)
            .output_len(Self::OUTPUT_LENGTH)
            .build()
            .map_err(|err| AuthCryptoError::InvalidArgon2Params(err.to_string()))
    }

    /// Build a helper with caller-specified Argon2 parameters (tests and
    /// constrained hosts).
    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, AuthCryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(AuthCryptoError::EmptyPasswordPepper);
        }

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::default(), params);

        let mut crypto = Self {
            argon2,
            password_pepper: Zeroizing::new(pepper.to_vec()),
            dummy_hash: String::new(),
        };
        crypto.dummy_hash = crypto.hash_password(DUMMY_PASSWORD)?;
        Ok(crypto)
    }

    /// A hash under the configured costs that no real account holds.
    /// Verifying against it costs the same as a real check.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Hash a password with a random salt and the shared pepper. The result
    /// is a PHC string suitable for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthCryptoError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| AuthCryptoError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;

        let hash = self.argon2.hash_password(&material, &salt)?.to_string();
        Ok(hash)
    }

    /// Verify a password against a stored PHC hash. `Ok(false)` is a
    /// mismatch; `Err` means the stored hash could not be parsed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        let material = self.peppered(password);

        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }
}

#[cfg(test)]
pub(crate) fn test_crypto() -> AuthCrypto {
    // Minimum Argon2 cost keeps the suite fast.
    AuthCrypto::with_params("test-pepper", AuthCrypto::params(8, 1, 1).unwrap()).unwrap()
}
