use envkey_core::{EnvironmentVariables, Error, Result};
use once_cell::sync::Lazy;
use std::env;
use std::sync::RwLock;

/// Global RwLock for thread-safe environment variable access
/// Using RwLock since reads are much more common than writes
static ENV_LOCK: Lazy<RwLock<()>> = Lazy::new(|| RwLock::new(()));

/// Thread-safe environment variable operations
pub struct SyncEnv;

impl SyncEnv {
    /// Set an environment variable with thread safety
    pub fn set_var<K: AsRef<str>, V: AsRef<str>>(key: K, value: V) -> Result<()> {
        let key = key.as_ref();
        validate_key(key)?;

        let _guard = ENV_LOCK.write().map_err(|e| {
            Error::environment(
                "ENV_LOCK",
                format!("Failed to acquire environment write lock: {e}"),
            )
        })?;

        env::set_var(key, value.as_ref());
        Ok(())
    }

    /// Set `key` only when it is absent, returning whether it was written.
    ///
    /// The presence check and the write happen under one write lock.
    pub fn set_var_if_absent<K: AsRef<str>, V: AsRef<str>>(key: K, value: V) -> Result<bool> {
        let key = key.as_ref();
        validate_key(key)?;

        let _guard = ENV_LOCK.write().map_err(|e| {
            Error::environment(
                "ENV_LOCK",
                format!("Failed to acquire environment write lock: {e}"),
            )
        })?;

        if env::var_os(key).is_some() {
            return Ok(false);
        }
        env::set_var(key, value.as_ref());
        Ok(true)
    }

    /// Get an environment variable with thread safety
    pub fn var<K: AsRef<str>>(key: K) -> Result<Option<String>> {
        let _guard = ENV_LOCK.read().map_err(|e| {
            Error::environment(
                "ENV_LOCK",
                format!("Failed to acquire environment read lock: {e}"),
            )
        })?;

        Ok(env::var(key.as_ref()).ok())
    }

    /// Whether the variable is present at all, including with an empty value
    pub fn contains<K: AsRef<str>>(key: K) -> Result<bool> {
        let _guard = ENV_LOCK.read().map_err(|e| {
            Error::environment(
                "ENV_LOCK",
                format!("Failed to acquire environment read lock: {e}"),
            )
        })?;

        Ok(env::var_os(key.as_ref()).is_some())
    }

    /// Remove an environment variable with thread safety
    pub fn remove_var<K: AsRef<str>>(key: K) -> Result<()> {
        let _guard = ENV_LOCK.write().map_err(|e| {
            Error::environment(
                "ENV_LOCK",
                format!("Failed to acquire environment write lock: {e}"),
            )
        })?;

        env::remove_var(key.as_ref());
        Ok(())
    }

    /// Snapshot of all environment variables with thread safety.
    ///
    /// Entries that are not valid unicode cannot be represented and are
    /// skipped with a warning naming the variable.
    pub fn vars() -> Result<EnvironmentVariables> {
        let _guard = ENV_LOCK.read().map_err(|e| {
            Error::environment(
                "ENV_LOCK",
                format!("Failed to acquire environment read lock: {e}"),
            )
        })?;

        let mut vars = EnvironmentVariables::new();
        for (key, value) in env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    vars.insert(key, value);
                }
                (Ok(key), Err(_)) => {
                    tracing::warn!(%key, "skipping variable whose value is not valid unicode");
                }
                (Err(key), _) => {
                    tracing::warn!(
                        key = %key.to_string_lossy(),
                        "skipping variable whose name is not valid unicode"
                    );
                }
            }
        }
        Ok(vars)
    }
}

/// `std::env::set_var` panics on these, so reject them up front
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('=') || key.contains('\0') {
        return Err(Error::environment(
            key,
            "variable names must be non-empty and contain no '=' or NUL",
        ));
    }
    Ok(())
}
