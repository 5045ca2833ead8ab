//! Environment variable handling for the Vasatey service.
//!
//! Configuration values are read from `VASATEY__SECTION__KEY` variables, secrets
//! from `VASATEY_SECRET_SECTION_KEY` (with a fallback to the legacy
//! `SECTION_KEY` form). A small set of flat variables (`MAX_RETRIES`,
//! `CLEANUP_BATCH_SIZE`, ...) is honoured as well, because existing deployments
//! set them directly.

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "VASATEY";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "VASATEY_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value in config files that is replaced by a secret env var.
pub const SECRET_MARKER: &str = "secret_from_env";

pub const MAX_RETRIES: &str = "MAX_RETRIES";
pub const RETRY_DELAY_BASE_MS: &str = "RETRY_DELAY_BASE_MS";
pub const CLEANUP_BATCH_SIZE: &str = "CLEANUP_BATCH_SIZE";
pub const CLEANUP_DEFAULT_DAYS_OLD: &str = "CLEANUP_DEFAULT_DAYS_OLD";
pub const FIREBASE_SERVICE_ACCOUNT: &str = "FIREBASE_SERVICE_ACCOUNT";
pub const FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const DATABASE_URL: &str = "DATABASE_URL";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.host"` becomes `"VASATEY__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"firebase.service_account_json"` becomes
/// `"VASATEY_SECRET_FIREBASE_SERVICE_ACCOUNT_JSON"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its legacy environment variable name
///
/// `"firebase.key_path"` becomes `"FIREBASE_KEY_PATH"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let service = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", service, key).to_uppercase()
}

/// Look up a configuration path in the environment.
pub fn get_config_env_var(path: &str) -> Option<String> {
    let env_var = config_path_to_env_var(path);
    env::var(&env_var).ok()
}

/// Look up a secret path, trying the prefixed name before the legacy one.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    let env_var = secret_path_to_env_var(path);
    if let Ok(value) = env::var(&env_var) {
        return Some(value);
    }

    let legacy_env_var = legacy_secret_path_to_env_var(path);
    env::var(&legacy_env_var).ok()
}

/// Paths containing "secret", "key", "password", "token" or "service_account"
/// are treated as secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
        || path_lower.contains("service_account")
}

/// Get an environment variable for a path, secret or not.
pub fn get_env_var(path: &str) -> Option<String> {
    if is_secret_path(path) {
        get_secret_env_var(path)
    } else {
        get_config_env_var(path)
    }
}

/// Replace every `"secret_from_env"` string in a JSON value with the value of
/// the environment variable derived from its path.
///
/// Returns `true` if any value was replaced.
pub fn inject_env_vars(value: &mut serde_json::Value) -> bool {
    inject_with(value, &get_env_var)
}

/// Same as [`inject_env_vars`], with an explicit lookup function.
pub fn inject_with<F>(value: &mut serde_json::Value, lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    use serde_json::Value;

    fn walk<F>(path: Vec<String>, obj: &mut Value, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced |= walk(new_path, v, lookup);
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(i.to_string());
                    replaced |= walk(new_path, v, lookup);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = lookup(&path_str) {
                    *s = env_val;
                    replaced = true;
                } else {
                    tracing::warn!("env var for {} not found", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value, lookup)
}
