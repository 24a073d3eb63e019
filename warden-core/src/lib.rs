//! # Warden Core
//!
//! User-account data access for an authentication/authorization service:
//! user records, Argon2 password hashes, credential verification and
//! group-based access checks.
//!
//! ## Overview
//!
//! - **Access checks**: [`services::AccessChecker`] answers whether a user's
//!   group grants a permission name. Names are flat (`reports`) or compound
//!   (`billing::view`); a grant on the parent scope or on `root` also counts.
//! - **Credentials**: [`services::CredentialVerifier`] checks a password
//!   against the stored hash and returns the user with its group and grants.
//! - **Accounts**: [`services::UserService`] covers lookups, create, update,
//!   delete and password changes.
//! - **Storage**: repository traits in [`database::ports`] with PostgreSQL
//!   adapters behind the `database` feature.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden_core::{
//!     auth::AuthCrypto,
//!     database::{PoolSettings, PostgresDatabase},
//!     services::{AccessChecker, CredentialVerifier},
//! };
//!
//! async fn login_and_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let db = PostgresDatabase::new(url, PoolSettings::default()).await?;
//!     let crypto = Arc::new(AuthCrypto::new("server-side-pepper")?);
//!
//!     let verifier = CredentialVerifier::new(db.users(), db.access(), crypto);
//!     let user = verifier.login("ada@example.com", "correct horse").await?;
//!
//!     let checker = AccessChecker::new(db.users(), db.access());
//!     if checker.has_access(user.id, "billing::view").await? {
//!         println!("{} may view billing", user.username);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Password hashing
pub mod auth;

/// Repository ports and the PostgreSQL adapters
pub mod database;

/// Users, groups and access grants
pub mod domain;

/// Error types and error handling utilities
pub mod error;

/// Access checks, credential verification and account management
pub mod services;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{Result, UserError};
