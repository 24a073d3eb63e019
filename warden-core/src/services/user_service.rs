use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::auth::AuthCrypto;
use crate::database::ports::UsersRepository;
use crate::domain::{Actor, CreateUserRequest, NewUser, User, UserUpdate};
use crate::error::{Result, UserError};

/// Account lookups and administrative writes.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepository>,
    crypto: Arc<AuthCrypto>,
}

impl fmt::Debug for UserService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserService")
            .field("users_refs", &Arc::strong_count(&self.users))
            .finish()
    }
}

impl UserService {
    pub fn new(users: Arc<dyn UsersRepository>, crypto: Arc<AuthCrypto>) -> Self {
        Self { users, crypto }
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User {} not found", id)))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User '{}' not found", username)))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User '{}' not found", email)))
    }

    /// Hash the initial password, assign a fresh id and store the account.
    pub async fn create(&self, request: CreateUserRequest, actor: Actor) -> Result<User> {
        let new_user = NewUser::from_request(&request);
        let password_hash = super::hash_password(&self.crypto, &request.password).await?;

        self.users.create(&new_user, &password_hash, actor).await
    }

    pub async fn update(&self, update: UserUpdate, actor: Actor) -> Result<()> {
        self.users.update(&update, actor).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.users.delete(id).await
    }

    /// Replace the stored hash. The previous password stops verifying as
    /// soon as this returns.
    pub async fn change_password(
        &self,
        id: Uuid,
        new_password: &str,
        actor: Actor,
    ) -> Result<()> {
        let password_hash = super::hash_password(&self.crypto, new_password).await?;
        self.users.update_password(id, &password_hash, actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::test_crypto;
    use crate::services::CredentialVerifier;
    use crate::services::test_support::InMemoryDirectory;
    use crate::domain::UserLookup;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        service: UserService,
        verifier: CredentialVerifier,
        group_id: Uuid,
        admin: Actor,
    }

    async fn fixture() -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        let group_id = directory.add_group("staff", &["reports"]).await;
        let crypto = Arc::new(test_crypto());
        Fixture {
            service: UserService::new(directory.clone(), crypto.clone()),
            verifier: CredentialVerifier::new(directory.clone(), directory.clone(), crypto),
            directory,
            group_id,
            admin: Actor(Uuid::new_v4()),
        }
    }

    fn request(group_id: Uuid, username: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            company_id: Uuid::new_v4(),
            region_id: None,
            branch_id: Some(Uuid::new_v4()),
            group_id,
            username: username.into(),
            name: "Grace Hopper".into(),
            email: format!("{username}@example.com"),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn created_password_verifies() {
        let f = fixture().await;
        let created = f
            .service
            .create(request(f.group_id, "grace", "cobol-1959"), f.admin)
            .await
            .unwrap();

        assert_eq!(created.group.id, f.group_id);
        assert_eq!(f.directory.updated_by(created.id).await, Some(f.admin.id()));

        let hash = f.directory.password_hash(created.id).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("cobol-1959"));

        f.verifier.login("grace", "cobol-1959").await.unwrap();
        assert!(f.verifier.login("grace", "cobol-1960").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn change_password_retires_old_one() {
        let f = fixture().await;
        let created = f
            .service
            .create(request(f.group_id, "grace", "first-pass"), f.admin)
            .await
            .unwrap();

        f.service
            .change_password(created.id, "second-pass", Actor(created.id))
            .await
            .unwrap();

        let lookup = UserLookup::Id(created.id);
        assert!(
            f.verifier
                .verify_password(&lookup, "first-pass")
                .await
                .unwrap_err()
                .is_not_found()
        );
        f.verifier
            .verify_password(&lookup, "second-pass")
            .await
            .unwrap();
        assert_eq!(f.directory.updated_by(created.id).await, Some(created.id));
    }

    #[tokio::test]
    async fn lookups_of_missing_users_are_not_found() {
        let f = fixture().await;
        assert!(f.service.get(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(f.service.get_by_username("ghost").await.unwrap_err().is_not_found());
        assert!(
            f.service
                .get_by_email("ghost@example.com")
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(
            f.service
                .change_password(Uuid::new_v4(), "pw", f.admin)
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(f.service.delete(Uuid::new_v4()).await.unwrap_err().is_not_found());

        let missing = UserUpdate {
            name: Some("Nobody".into()),
            ..UserUpdate::new(Uuid::new_v4())
        };
        assert!(f.service.update(missing, f.admin).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_and_delete() {
        let f = fixture().await;
        let other_group = f.directory.add_group("auditors", &["reports::view"]).await;
        let created = f
            .service
            .create(request(f.group_id, "grace", "pw"), f.admin)
            .await
            .unwrap();

        let region = Uuid::new_v4();
        f.service
            .update(
                UserUpdate {
                    id: created.id,
                    region_id: Some(Some(region)),
                    branch_id: Some(None),
                    group_id: Some(other_group),
                    name: Some("Rear Admiral Hopper".into()),
                },
                f.admin,
            )
            .await
            .unwrap();

        let fetched = f.service.get_by_email("grace@example.com").await.unwrap();
        assert_eq!(fetched.region_id, Some(region));
        assert_eq!(fetched.branch_id, None);
        assert_eq!(fetched.group.name, "auditors");
        assert_eq!(fetched.name, "Rear Admiral Hopper");

        f.service.delete(created.id).await.unwrap();
        assert!(f.service.get(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn omitted_fields_keep_their_values() {
        let f = fixture().await;
        let created = f
            .service
            .create(request(f.group_id, "grace", "pw"), f.admin)
            .await
            .unwrap();

        f.service
            .update(
                UserUpdate {
                    name: Some("Amazing Grace".into()),
                    ..UserUpdate::new(created.id)
                },
                f.admin,
            )
            .await
            .unwrap();

        let fetched = f.service.get(created.id).await.unwrap();
        assert_eq!(fetched.name, "Amazing Grace");
        assert_eq!(fetched.group.id, f.group_id);
        assert_eq!(fetched.region_id, created.region_id);
        assert_eq!(fetched.branch_id, created.branch_id);
        assert!(fetched.branch_id.is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_as_email() {
        let f = fixture().await;
        f.service
            .create(request(f.group_id, "grace", "pw"), f.admin)
            .await
            .unwrap();

        let mut twin = request(f.group_id, "hopper", "pw");
        twin.email = "grace@example.com".into();
        let err = f.service.create(twin, f.admin).await.unwrap_err();
        assert!(matches!(err, UserError::Internal(ref msg) if msg == "Email already exists"));

        let err = f
            .service
            .create(request(f.group_id, "grace", "pw"), f.admin)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Internal(ref msg) if msg == "Username already exists"));
    }
}
