//! In-memory repositories for service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::crypto::test_crypto;
use crate::database::ports::{AccessRepository, UsersRepository};
use crate::domain::{
    Access, Actor, Group, NewUser, User, UserCredentials, UserLookup, UserUpdate,
};
use crate::error::{Result, UserError};

struct StoredUser {
    user: User,
    password_hash: String,
    updated_by: Option<Uuid>,
}

pub(crate) struct InMemoryDirectory {
    users: Mutex<HashMap<Uuid, StoredUser>>,
    groups: Mutex<HashMap<Uuid, (String, Vec<Access>)>>,
    fail_reads: AtomicBool,
}

impl InMemoryDirectory {
    pub(crate) fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) async fn add_group(&self, name: &str, grants: &[&str]) -> Uuid {
        let id = Uuid::new_v4();
        let access = grants
            .iter()
            .map(|grant| Access {
                id: Uuid::new_v4(),
                name: (*grant).to_string(),
            })
            .collect();
        self.groups.lock().await.insert(id, (name.to_string(), access));
        id
    }

    pub(crate) async fn add_user(
        &self,
        username: &str,
        email: &str,
        group_id: Uuid,
        password: &str,
    ) -> Uuid {
        let group_name = self.groups.lock().await[&group_id].0.clone();
        let id = Uuid::new_v4();
        let user = User {
            id,
            company_id: Uuid::new_v4(),
            region_id: None,
            branch_id: None,
            username: username.to_string(),
            name: username.to_string(),
            email: email.to_string(),
            group: Group {
                id: group_id,
                name: group_name,
                access: Vec::new(),
            },
        };
        let password_hash = test_crypto().hash_password(password).unwrap();
        self.users.lock().await.insert(
            id,
            StoredUser {
                user,
                password_hash,
                updated_by: None,
            },
        );
        id
    }

    pub(crate) async fn password_hash(&self, id: Uuid) -> Option<String> {
        self.users
            .lock()
            .await
            .get(&id)
            .map(|stored| stored.password_hash.clone())
    }

    pub(crate) async fn updated_by(&self, id: Uuid) -> Option<Uuid> {
        self.users.lock().await.get(&id).and_then(|stored| stored.updated_by)
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(UserError::Internal("connection reset".into()));
        }
        Ok(())
    }

    async fn find_where(&self, predicate: impl Fn(&User) -> bool) -> Result<Option<StoredView>> {
        self.check_reads()?;
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|stored| predicate(&stored.user))
            .map(|stored| StoredView {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }
}

struct StoredView {
    user: User,
    password_hash: String,
}

#[async_trait]
impl UsersRepository for InMemoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.find_where(|u| u.id == id).await?.map(|v| v.user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .find_where(|u| u.username == username)
            .await?
            .map(|v| v.user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.find_where(|u| u.email == email).await?.map(|v| v.user))
    }

    async fn find_credentials(
        &self,
        lookup: &UserLookup,
    ) -> Result<Option<UserCredentials>> {
        let found = match lookup {
            UserLookup::Id(id) => self.find_where(|u| u.id == *id).await?,
            UserLookup::Username(username) => {
                self.find_where(|u| &u.username == username).await?
            }
            UserLookup::Email(email) => self.find_where(|u| &u.email == email).await?,
        };
        Ok(found.map(|v| UserCredentials {
            user: v.user,
            password_hash: v.password_hash,
        }))
    }

    async fn find_group_id(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self
            .find_where(|u| u.id == user_id)
            .await?
            .map(|v| v.user.group.id))
    }

    async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
        actor: Actor,
    ) -> Result<User> {
        let group_name = self
            .groups
            .lock()
            .await
            .get(&user.group_id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| UserError::Internal("Group does not exist".into()))?;

        let mut users = self.users.lock().await;
        if users.values().any(|stored| stored.user.username == user.username) {
            return Err(UserError::Internal("Username already exists".into()));
        }
        if users.values().any(|stored| stored.user.email == user.email) {
            return Err(UserError::Internal("Email already exists".into()));
        }

        let created = User {
            id: user.id,
            company_id: user.company_id,
            region_id: user.region_id,
            branch_id: user.branch_id,
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            group: Group {
                id: user.group_id,
                name: group_name,
                access: Vec::new(),
            },
        };
        users.insert(
            user.id,
            StoredUser {
                user: created.clone(),
                password_hash: password_hash.to_string(),
                updated_by: Some(actor.id()),
            },
        );
        Ok(created)
    }

    async fn update(&self, update: &UserUpdate, actor: Actor) -> Result<()> {
        let group = match update.group_id {
            Some(group_id) => Some(
                self.groups
                    .lock()
                    .await
                    .get(&group_id)
                    .map(|(name, _)| Group {
                        id: group_id,
                        name: name.clone(),
                        access: Vec::new(),
                    })
                    .ok_or_else(|| UserError::Internal("Group does not exist".into()))?,
            ),
            None => None,
        };

        let mut users = self.users.lock().await;
        let stored = users
            .get_mut(&update.id)
            .ok_or_else(|| UserError::NotFound(format!("User {} not found", update.id)))?;
        if let Some(region_id) = update.region_id {
            stored.user.region_id = region_id;
        }
        if let Some(branch_id) = update.branch_id {
            stored.user.branch_id = branch_id;
        }
        if let Some(name) = &update.name {
            stored.user.name = name.clone();
        }
        if let Some(group) = group {
            stored.user.group = group;
        }
        stored.updated_by = Some(actor.id());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.users
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(format!("User {} not found", id)))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        actor: Actor,
    ) -> Result<()> {
        let mut users = self.users.lock().await;
        let stored = users
            .get_mut(&id)
            .ok_or_else(|| UserError::NotFound(format!("User {} not found", id)))?;
        stored.password_hash = password_hash.to_string();
        stored.updated_by = Some(actor.id());
        Ok(())
    }
}

#[async_trait]
impl AccessRepository for InMemoryDirectory {
    async fn find_group_access(&self, group_id: Uuid) -> Result<Vec<Access>> {
        self.check_reads()?;
        let mut access = self
            .groups
            .lock()
            .await
            .get(&group_id)
            .map(|(_, access)| access.clone())
            .unwrap_or_default();
        access.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(access)
    }
}
