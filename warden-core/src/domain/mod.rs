//! Domain records for users, groups and access grants.

pub mod access;
pub mod user;

pub use access::{Access, AccessName, AccessSet, ROOT_ACCESS, SCOPE_DELIMITER};
pub use user::{
    Actor, CreateUserRequest, Group, NewUser, User, UserCredentials,
    UserLookup, UserUpdate,
};
