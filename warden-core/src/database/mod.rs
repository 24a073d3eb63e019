pub mod ports;

#[cfg(feature = "database")]
pub mod infrastructure;
#[cfg(feature = "database")]
pub mod postgres;

pub use ports::{AccessRepository, UsersRepository};

#[cfg(feature = "database")]
pub use postgres::{PoolSettings, PoolStats, PostgresDatabase};
