//! Loading a `warden.toml` from disk through the public loader.

use std::{collections::HashMap, fs, path::Path, time::Duration};

use tempfile::TempDir;
use url::Url;
use warden_config::{ConfigLoadError, ConfigLoader, EnvConfig};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn env(pairs: &[(&str, &str)]) -> EnvConfig {
    let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
    EnvConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
}

#[test]
fn file_values_flow_into_config() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let secret = write(dir.path(), "db_password", "s3cret\n");
    let config_path = write(
        dir.path(),
        "warden.toml",
        &format!(
            r#"
            log_filter = "warden_core=debug"

            [database]
            url = "postgresql://warden@db.internal:5432/accounts"
            password_file = "{}"
            max_connections = 3
            acquire_timeout = "2s"

            [auth]
            password_pepper = "0123456789abcdef0123"
            argon2_memory_kib = 19456
            argon2_iterations = 2
            "#,
            secret.display()
        ),
    );

    let load = ConfigLoader::new()
        .with_config_path(&config_path)
        .load_with_env(EnvConfig::default())?;
    let config = load.config;

    assert!(!config.dev_mode);
    assert_eq!(config.metadata.config_path.as_deref(), Some(config_path.as_path()));
    assert_eq!(config.log_filter, "warden_core=debug");

    let url = Url::parse(config.database.primary_url.as_deref().unwrap_or_default())?;
    assert_eq!(url.username(), "warden");
    assert_eq!(url.password(), Some("s3cret"));

    let pool = config.database.pool_settings();
    assert_eq!(pool.max_connections, 3);
    assert_eq!(pool.acquire_timeout, Duration::from_secs(2));

    assert_eq!(config.auth.argon2_memory_kib, 19456);
    assert_eq!(config.auth.argon2_iterations, 2);
    assert!(load.warnings.is_empty(), "{:?}", load.warnings);

    Ok(())
}

#[test]
fn warden_config_env_points_at_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write(dir.path(), "custom.toml", "dev_mode = true\n");

    let load = ConfigLoader::new().load_with_env(env(&[(
        "WARDEN_CONFIG",
        path.to_str().unwrap_or_default(),
    )]))?;

    assert!(load.config.dev_mode);
    assert_eq!(load.config.metadata.config_path, Some(path));
    Ok(())
}

#[test]
fn malformed_file_reports_path() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write(dir.path(), "warden.toml", "[database\nurl = 1\n");

    let err = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(EnvConfig::default())
        .unwrap_err();

    match err {
        ConfigLoadError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn env_file_is_read_before_composing() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config_path = write(dir.path(), "warden.toml", "dev_mode = true\n");
    let env_path = write(dir.path(), ".env", "WARDEN_TEST_ENV_FILE_MARKER=1\n");

    let load = ConfigLoader::new()
        .with_config_path(&config_path)
        .with_env_file(&env_path)
        .load()?;

    assert!(load.config.metadata.env_file_loaded);
    assert_eq!(
        std::env::var("WARDEN_TEST_ENV_FILE_MARKER").as_deref(),
        Ok("1")
    );
    Ok(())
}
