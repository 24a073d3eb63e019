//! Password hashing primitives.

pub mod crypto;

pub use crypto::{AuthCrypto, AuthCryptoError};
