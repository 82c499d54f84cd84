//! Where merged variables land

use envkey_core::{EnvironmentVariables, Result};
use envkey_utils::SyncEnv;

/// A key/value environment the merge engine can read and fill.
///
/// A key that is present, even with an empty value, counts as set.
pub trait EnvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn contains(&self, key: &str) -> Result<bool>;

    /// Write `value` only if `key` is absent; returns whether it was written
    fn set_if_absent(&mut self, key: &str, value: &str) -> Result<bool>;

    /// Every variable, for building a child process environment
    fn snapshot(&self) -> Result<EnvironmentVariables>;
}

/// The real process environment, accessed under [`SyncEnv`]'s lock
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvStore;

impl EnvStore for OsEnvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        SyncEnv::var(key)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        SyncEnv::contains(key)
    }

    fn set_if_absent(&mut self, key: &str, value: &str) -> Result<bool> {
        SyncEnv::set_var_if_absent(key, value)
    }

    fn snapshot(&self) -> Result<EnvironmentVariables> {
        SyncEnv::vars()
    }
}

/// In-memory environment for tests and dry runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnvStore {
    vars: EnvironmentVariables,
}

impl MemoryEnvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key, value);
        self
    }

    #[must_use]
    pub fn vars(&self) -> &EnvironmentVariables {
        &self.vars
    }
}

impl From<EnvironmentVariables> for MemoryEnvStore {
    fn from(vars: EnvironmentVariables) -> Self {
        Self { vars }
    }
}

impl EnvStore for MemoryEnvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.vars.get(key).cloned())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.vars.contains(key))
    }

    fn set_if_absent(&mut self, key: &str, value: &str) -> Result<bool> {
        if self.vars.contains(key) {
            return Ok(false);
        }
        self.vars.insert(key, value);
        Ok(true)
    }

    fn snapshot(&self) -> Result<EnvironmentVariables> {
        Ok(self.vars.clone())
    }
}
