use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::access::{Access, AccessSet};

/// The group a user belongs to, with its access grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    /// Empty unless the read path loaded the grants.
    #[serde(default)]
    pub access: Vec<Access>,
}

impl Group {
    pub fn access_set(&self) -> AccessSet {
        self.access.iter().collect()
    }
}

/// Public user projection. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub region_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub username: String,
    pub name: String,
    pub email: String,
    pub group: Group,
}

/// A user row together with its stored password hash.
#[derive(Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// How a caller identifies the account being looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Id(Uuid),
    Username(String),
    Email(String),
}

impl UserLookup {
    /// Interpret a login handle: anything containing `@` is an email,
    /// everything else a username.
    pub fn from_login(login: &str) -> Self {
        let login = login.trim();
        if login.contains('@') {
            UserLookup::Email(login.to_string())
        } else {
            UserLookup::Username(login.to_string())
        }
    }
}

impl fmt::Display for UserLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserLookup::Id(id) => write!(f, "id {}", id),
            UserLookup::Username(username) => write!(f, "username {}", username),
            UserLookup::Email(email) => write!(f, "email {}", email),
        }
    }
}

/// The user performing a write; recorded in `users.updated_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor(pub Uuid);

impl Actor {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for Actor {
    fn from(id: Uuid) -> Self {
        Actor(id)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to create a user account.
#[derive(Clone)]
pub struct CreateUserRequest {
    pub company_id: Uuid,
    pub region_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub group_id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("company_id", &self.company_id)
            .field("region_id", &self.region_id)
            .field("branch_id", &self.branch_id)
            .field("group_id", &self.group_id)
            .field("username", &self.username)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A validated user row ready for insertion, id already assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Uuid,
    pub company_id: Uuid,
    pub region_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub group_id: Uuid,
    pub username: String,
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn from_request(request: &CreateUserRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id: request.company_id,
            region_id: request.region_id,
            branch_id: request.branch_id,
            group_id: request.group_id,
            username: request.username.trim().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
        }
    }
}

/// Partial update of an existing user. `None` leaves a field as stored.
///
/// Region and branch are nullable columns, so they take a nested option:
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: Uuid,
    pub region_id: Option<Option<Uuid>>,
    pub branch_id: Option<Option<Uuid>>,
    pub group_id: Option<Uuid>,
    pub name: Option<String>,
}

impl UserUpdate {
    /// An update of `id` that changes nothing yet.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            region_id: None,
            branch_id: None,
            group_id: None,
            name: None,
        }
    }
}
