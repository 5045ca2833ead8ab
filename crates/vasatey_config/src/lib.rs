//! Configuration for the Vasatey notification service.
//!
//! Configuration is layered: optional `config/default` and `config/{RUN_ENV}`
//! files, then `VASATEY__*` environment variables, then `secret_from_env`
//! markers, then the flat deployment variables listed in [`env_vars`].
//! Every section has defaults, so an empty configuration is valid.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;


/// Loads the configuration from files and the process environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let dotenv_path = ensure_dotenv_loaded();
    debug!("dotenv path: {}", dotenv_path);

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("VASATEY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let prefix = env_vars::get_config_prefix();

    let builder = Config::builder()
        .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
        .add_source(File::with_name(&format!("{}/{}", config_dir, run_env)).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let config = build_config(builder)?;
    let config = apply_env_overrides_from_marker(config)?;
    let config = apply_flat_env_overrides(config, |key| env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Deserializes an [`AppConfig`] from a prepared builder.
pub fn build_config(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    builder.build()?.try_deserialize()
}

/// Replaces `"secret_from_env"` markers with values from the environment.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    if !env_vars::inject_env_vars(&mut json) {
        return Ok(config);
    }
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to apply secrets: {err}")))
}

/// Applies the flat deployment variables (`MAX_RETRIES`, `RETRY_DELAY_BASE_MS`,
/// `CLEANUP_BATCH_SIZE`, `CLEANUP_DEFAULT_DAYS_OLD`, `FIREBASE_SERVICE_ACCOUNT`,
/// `FIREBASE_PROJECT_ID`, `DATABASE_URL`) on top of the layered configuration.
pub fn apply_flat_env_overrides<F>(
    mut config: AppConfig,
    lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(env_vars::MAX_RETRIES) {
        config.dispatch.max_retries = parse_var(env_vars::MAX_RETRIES, &value)?;
    }
    if let Some(value) = lookup(env_vars::RETRY_DELAY_BASE_MS) {
        config.dispatch.retry_delay_base_ms = parse_var(env_vars::RETRY_DELAY_BASE_MS, &value)?;
    }
    if let Some(value) = lookup(env_vars::CLEANUP_BATCH_SIZE) {
        config.cleanup.batch_size = parse_var(env_vars::CLEANUP_BATCH_SIZE, &value)?;
    }
    if let Some(value) = lookup(env_vars::CLEANUP_DEFAULT_DAYS_OLD) {
        config.cleanup.default_days_old = parse_var(env_vars::CLEANUP_DEFAULT_DAYS_OLD, &value)?;
    }
    if let Some(json) = lookup(env_vars::FIREBASE_SERVICE_ACCOUNT) {
        config
            .firebase
            .get_or_insert_with(FirebaseConfig::default)
            .service_account_json = Some(json);
    }
    if let Some(project_id) = lookup(env_vars::FIREBASE_PROJECT_ID) {
        config
            .firebase
            .get_or_insert_with(FirebaseConfig::default)
            .project_id = Some(project_id);
    }
    if let Some(url) = lookup(env_vars::DATABASE_URL) {
        config.database = Some(DatabaseConfig { url });
    }
    Ok(config)
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Message(format!("{name} has an invalid value: {value:?}")))
}

/// Rejects values the dispatch and cleanup engines cannot work with.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.dispatch.max_retries == 0 {
        return Err(ConfigError::Message(
            "dispatch.max_retries must be at least 1".to_string(),
        ));
    }
    if config.dispatch.min_token_length == 0 {
        return Err(ConfigError::Message(
            "dispatch.min_token_length must be at least 1".to_string(),
        ));
    }
    if config.cleanup.batch_size == 0 || config.cleanup.batch_size > MAX_CLEANUP_BATCH_SIZE {
        return Err(ConfigError::Message(format!(
            "cleanup.batch_size must be between 1 and {}",
            MAX_CLEANUP_BATCH_SIZE
        )));
    }
    if config.cleanup.schedule_interval_hours == Some(0) {
        return Err(ConfigError::Message(
            "cleanup.schedule_interval_hours must be positive".to_string(),
        ));
    }
    Ok(())
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns its path.
///
/// The path is taken from `DOTENV_OVERRIDE`, then from a first command line
/// argument starting with `.env`, and defaults to `.env`.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
