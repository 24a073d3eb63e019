use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::auth::AuthCrypto;
use warden_core::database::PostgresDatabase;
use warden_core::domain::{Actor, CreateUserRequest, User};
use warden_core::services::{AccessChecker, CredentialVerifier, UserService};

/// Services wired to a test database.
pub struct TestDirectoryHarness {
    db: PostgresDatabase,
    users: UserService,
    verifier: CredentialVerifier,
    checker: AccessChecker,
    admin: Actor,
}

impl TestDirectoryHarness {
    /// Construct a new harness backed by the provided pool.
    pub fn new(pool: PgPool) -> Result<Self> {
        let db = PostgresDatabase::from_pool(pool);
        let crypto = Arc::new(AuthCrypto::with_params(
            "test-pepper",
            AuthCrypto::params(8, 1, 1)?,
        )?);

        Ok(Self {
            users: UserService::new(db.users(), crypto.clone()),
            verifier: CredentialVerifier::new(db.users(), db.access(), crypto),
            checker: AccessChecker::new(db.users(), db.access()),
            admin: Actor(Uuid::new_v4()),
            db,
        })
    }

    pub fn db(&self) -> &PostgresDatabase {
        &self.db
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    pub fn checker(&self) -> &AccessChecker {
        &self.checker
    }

    pub fn admin(&self) -> Actor {
        self.admin
    }

    /// Create a user in `group_id` with the given password.
    pub async fn create_user(
        &self,
        username: &str,
        group_id: Uuid,
        password: &str,
    ) -> Result<User> {
        let user = self
            .users
            .create(
                CreateUserRequest {
                    company_id: Uuid::new_v4(),
                    region_id: None,
                    branch_id: None,
                    group_id,
                    username: username.to_string(),
                    name: username.to_string(),
                    email: format!("{username}@example.com"),
                    password: password.to_string(),
                },
                self.admin,
            )
            .await?;
        Ok(user)
    }
}
