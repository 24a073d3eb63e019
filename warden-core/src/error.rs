use thiserror::Error;

/// Failures surfaced to callers of the user-account layer.
///
/// Only two kinds are visible. `NotFound` covers a missing record as well as
/// a failed credential or permission check, so callers cannot tell those
/// apart. Everything the store or the hasher throws at us is `Internal`.
#[derive(Error, Debug)]
pub enum UserError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::NotFound(_))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => UserError::NotFound(err.to_string()),
            other => UserError::Internal(format!("Database error: {}", other)),
        }
    }
}

impl From<crate::auth::AuthCryptoError> for UserError {
    fn from(err: crate::auth::AuthCryptoError) -> Self {
        UserError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UserError>;
