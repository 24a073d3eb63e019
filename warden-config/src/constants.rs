//! Built-in defaults shared by the loader and validation.

/// Placeholder pepper used when none is configured. Only acceptable in
/// development mode.
pub const DEFAULT_PASSWORD_PEPPER: &str = "warden-development-pepper";

pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 0;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Config files tried, in order, when no path is given.
pub const DEFAULT_CONFIG_LOCATIONS: &[&str] = &["warden.toml", "config/warden.toml"];
