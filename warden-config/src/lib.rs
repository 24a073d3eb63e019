//! Configuration loading for Warden.
//!
//! Values are composed from the process environment (after `.env` is read
//! with `dotenvy`), an optional `warden.toml`, and built-in defaults, in that
//! order of precedence. Guard rails run on the composed result: fatal issues
//! become [`ConfigLoadError::GuardRail`], softer ones come back as
//! [`ConfigWarnings`].

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError,
};
pub use models::{
    AuthConfig, Config, ConfigMetadata, DatabaseConfig,
    sources::{EnvConfig, FileConfig},
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
