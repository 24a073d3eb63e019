//! PostgreSQL-backed repository implementations.

pub mod access;
pub mod users;
