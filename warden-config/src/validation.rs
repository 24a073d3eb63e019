use thiserror::Error;

use crate::models::{AuthConfig, Config};

/// Minimum Argon2 memory per lane, in KiB.
const MIN_MEMORY_KIB_PER_LANE: u32 = 8;
const MIN_PEPPER_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("invalid Argon2 cost parameters: {reason}")]
    InvalidArgon2Costs { reason: String },
    #[error("database pool min_connections ({min}) exceeds max_connections ({max})")]
    InvalidPoolBounds { min: u32, max: u32 },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    validate_argon2(&config.auth)?;

    if config.dev_mode {
        if config.auth.is_default_pepper() {
            warnings.push_with_hint(
                "AUTH_PASSWORD_PEPPER not set; using the development pepper",
                "Hashes created now will not verify once a real pepper is configured",
            );
        }
    } else {
        enforce_pepper(&config.auth)?;
    }

    let database = &config.database;
    if database.min_connections > database.max_connections {
        return Err(ConfigGuardRailError::InvalidPoolBounds {
            min: database.min_connections,
            max: database.max_connections,
        });
    }

    if database.primary_url.is_none() {
        warnings.push_with_hint(
            "No database URL configured",
            "Set DATABASE_URL, DATABASE_URL_FILE or database.url",
        );
    }

    Ok(warnings)
}

fn enforce_pepper(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    if auth.is_default_pepper() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: "uses the default placeholder value".into(),
        });
    }

    if auth.password_pepper.len() < MIN_PEPPER_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: format!("must be at least {MIN_PEPPER_LENGTH} characters"),
        });
    }

    Ok(())
}

fn validate_argon2(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    if auth.argon2_iterations == 0 {
        return Err(ConfigGuardRailError::InvalidArgon2Costs {
            reason: "iterations must be at least 1".into(),
        });
    }

    if auth.argon2_parallelism == 0 {
        return Err(ConfigGuardRailError::InvalidArgon2Costs {
            reason: "parallelism must be at least 1".into(),
        });
    }

    let floor = auth
        .argon2_parallelism
        .saturating_mul(MIN_MEMORY_KIB_PER_LANE);
    if auth.argon2_memory_kib < floor {
        return Err(ConfigGuardRailError::InvalidArgon2Costs {
            reason: format!(
                "memory must be at least {floor} KiB for parallelism {}",
                auth.argon2_parallelism
            ),
        });
    }

    Ok(())
}
