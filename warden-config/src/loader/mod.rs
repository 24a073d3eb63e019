pub mod db_url;
pub mod error;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use tracing::debug;
use warden_core::auth::AuthCrypto;

use crate::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_CONFIG_LOCATIONS, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, DEFAULT_PASSWORD_PEPPER,
};
use crate::models::{
    AuthConfig, Config, ConfigMetadata, DatabaseConfig,
    sources::{EnvConfig, FileConfig},
};
use crate::util::parse_duration;
use crate::validation::{self, ConfigWarnings};

use error::ConfigLoadError;

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Composes a [`Config`] from the process environment, an optional `.env`
/// file and an optional TOML file. Environment values take precedence over
/// the file, which takes precedence over built-in defaults.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env` into the process environment, then compose.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.compose(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose from an already-gathered environment. Does not touch `.env`.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        self.compose(env, false)
    }

    fn compose(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(
            file_config,
            env,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        debug!(
            config_path = ?config.metadata.config_path,
            env_file_loaded = config.metadata.env_file_loaded,
            dev_mode = config.dev_mode,
            "configuration loaded"
        );

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No warden.toml detected; using environment variables and defaults",
            "Pass --config or set WARDEN_CONFIG to point at a configuration file",
        );
    }

    let FileConfig {
        database: file_database,
        auth: file_auth,
        log_filter: file_log_filter,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let acquire_timeout = match env
        .database_acquire_timeout
        .as_deref()
        .map(|raw| ("DATABASE_ACQUIRE_TIMEOUT", raw))
        .or_else(|| {
            file_database
                .acquire_timeout
                .as_deref()
                .map(|raw| ("database.acquire_timeout", raw))
        }) {
        Some((key, raw)) => {
            parse_duration(raw).map_err(|_| ConfigLoadError::InvalidValue {
                key,
                value: raw.to_string(),
                expected: "a duration such as \"5s\"",
            })?
        }
        None => Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
    };

    let database = DatabaseConfig {
        primary_url: db_url::resolve_database_url(&env, &file_database)?,
        max_connections: parse_number(
            "DATABASE_MAX_CONNECTIONS",
            env.database_max_connections.as_deref(),
        )?
        .or(file_database.max_connections)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        min_connections: parse_number(
            "DATABASE_MIN_CONNECTIONS",
            env.database_min_connections.as_deref(),
        )?
        .or(file_database.min_connections)
        .unwrap_or(DEFAULT_MIN_CONNECTIONS),
        acquire_timeout,
    };

    let auth = AuthConfig {
        password_pepper: env
            .auth_password_pepper
            .clone()
            .or(file_auth.password_pepper)
            .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string()),
        argon2_memory_kib: parse_number(
            "AUTH_ARGON2_MEMORY_KIB",
            env.argon2_memory_kib.as_deref(),
        )?
        .or(file_auth.argon2_memory_kib)
        .unwrap_or(AuthCrypto::DEFAULT_MEMORY_KIB),
        argon2_iterations: parse_number(
            "AUTH_ARGON2_ITERATIONS",
            env.argon2_iterations.as_deref(),
        )?
        .or(file_auth.argon2_iterations)
        .unwrap_or(AuthCrypto::DEFAULT_ITERATIONS),
        argon2_parallelism: parse_number(
            "AUTH_ARGON2_PARALLELISM",
            env.argon2_parallelism.as_deref(),
        )?
        .or(file_auth.argon2_parallelism)
        .unwrap_or(AuthCrypto::DEFAULT_PARALLELISM),
    };

    let config = Config {
        database,
        auth,
        log_filter: env
            .log_filter
            .or(file_log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        dev_mode: env.dev_mode.or(file_dev_mode).unwrap_or(false),
        metadata,
    };

    warnings.extend(validation::apply_guard_rails(&config)?);

    Ok((config, warnings))
}

fn parse_number<T: FromStr>(
    key: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, ConfigLoadError> {
    raw.map(|raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|_| ConfigLoadError::InvalidValue {
                key,
                value: raw.to_string(),
                expected: "a non-negative integer",
            })
    })
    .transpose()
}
