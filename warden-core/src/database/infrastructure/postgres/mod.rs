//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::access::PostgresAccessRepository;
pub use repositories::users::PostgresUsersRepository;
