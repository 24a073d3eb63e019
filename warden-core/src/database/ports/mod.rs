//! Repository ports (interfaces) consumed by the services.
//! Implementations live in the Postgres adapter under
//! `database::infrastructure::postgres`.

pub mod access;
pub mod users;

pub use access::AccessRepository;
pub use users::UsersRepository;
