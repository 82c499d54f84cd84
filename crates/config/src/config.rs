//! Client configuration
//!
//! `ClientConfig` is the single source of truth for how the resolver is found
//! and invoked. It is immutable after construction and `Clone + Send + Sync`,
//! so it can be shared freely between threads.

use envkey_core::constants::{
    CLIENT_NAME, DEFAULT_EXT_DIR, DEFAULT_RESOLVER_VERSION, FETCH_TIMEOUT_VAR, SHOULD_CACHE_VAR,
    SOURCE_DIR_VAR, SOURCE_VERSION_VAR,
};
use envkey_core::{EnvironmentVariables, Error, Result};
use envkey_utils::SyncEnv;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Version of the `envkey-source` build to locate
    pub resolver_version: String,

    /// Directory holding the `envkey-source_<version>_<os>_<arch>` folders
    pub resolver_dir: PathBuf,

    /// Name reported to the resolver via `--client-name`
    pub client_name: String,

    /// Version reported to the resolver via `--client-version`
    pub client_version: String,

    /// Cache setting used when a call does not specify one
    pub cache_by_default: bool,

    /// Upper bound on one resolver invocation; `None` waits indefinitely
    pub fetch_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Build from the live process environment
    pub fn from_env() -> Result<Self> {
        let vars = SyncEnv::vars()?;
        Self::from_vars(&vars)
    }

    /// Build from an environment snapshot
    pub fn from_vars(vars: &EnvironmentVariables) -> Result<Self> {
        let mut builder =
            ClientConfigBuilder::new().cache_by_default(vars.contains(SHOULD_CACHE_VAR));

        if let Some(version) = non_empty(vars, SOURCE_VERSION_VAR) {
            builder = builder.resolver_version(version);
        }

        if let Some(dir) = non_empty(vars, SOURCE_DIR_VAR) {
            builder = builder.resolver_dir(dir);
        }

        if let Some(raw) = non_empty(vars, FETCH_TIMEOUT_VAR) {
            builder = builder.fetch_timeout(parse_timeout(raw)?);
        }

        let config = builder.build()?;
        tracing::debug!(
            resolver_version = %config.resolver_version,
            resolver_dir = %config.resolver_dir.display(),
            cache_by_default = config.cache_by_default,
            "loaded client configuration"
        );
        Ok(config)
    }

    /// Start a builder with default settings
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    resolver_version: Option<String>,
    resolver_dir: Option<PathBuf>,
    client_name: Option<String>,
    client_version: Option<String>,
    cache_by_default: bool,
    fetch_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Create a builder with every setting at its default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resolver_version(mut self, version: impl Into<String>) -> Self {
        self.resolver_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn resolver_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resolver_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn cache_by_default(mut self, enabled: bool) -> Self {
        self.cache_by_default = enabled;
        self
    }

    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let resolver_version = self
            .resolver_version
            .unwrap_or_else(|| DEFAULT_RESOLVER_VERSION.to_string());
        if resolver_version.trim().is_empty() {
            return Err(Error::configuration("resolver version must not be empty"));
        }

        let resolver_dir = match self.resolver_dir {
            Some(dir) => dir,
            None => default_resolver_dir()?,
        };

        Ok(ClientConfig {
            resolver_version,
            resolver_dir,
            client_name: self.client_name.unwrap_or_else(|| CLIENT_NAME.to_string()),
            client_version: self
                .client_version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            cache_by_default: self.cache_by_default,
            fetch_timeout: self.fetch_timeout,
        })
    }
}

/// `ext/` next to the running executable
fn default_resolver_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        let invoked = std::env::args_os().next().map(PathBuf::from).unwrap_or_default();
        Error::file_system(invoked, "current_exe", e)
    })?;
    let parent = exe.parent().ok_or_else(|| {
        Error::configuration(format!(
            "executable path '{}' has no parent directory",
            exe.display()
        ))
    })?;
    Ok(parent.join(DEFAULT_EXT_DIR))
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: f64 = raw.trim().parse().map_err(|_| {
        Error::configuration(format!(
            "{FETCH_TIMEOUT_VAR} must be a number of seconds, got '{raw}'"
        ))
    })?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(Error::configuration(format!(
            "{FETCH_TIMEOUT_VAR} must be positive, got '{raw}'"
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        Error::configuration(format!("{FETCH_TIMEOUT_VAR} is out of range, got '{raw}': {e}"))
    })
}

fn non_empty<'a>(vars: &'a EnvironmentVariables, key: &str) -> Option<&'a str> {
    vars.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> EnvironmentVariables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_vars(&vars(&[])).unwrap();
        assert_eq!(config.resolver_version, DEFAULT_RESOLVER_VERSION);
        assert_eq!(config.client_name, CLIENT_NAME);
        assert!(config.resolver_dir.ends_with(DEFAULT_EXT_DIR));
        assert!(!config.cache_by_default);
        assert_eq!(config.fetch_timeout, None);
    }

    #[test]
    fn test_should_cache_is_presence_based() {
        let config = ClientConfig::from_vars(&vars(&[(SHOULD_CACHE_VAR, "")])).unwrap();
        assert!(config.cache_by_default);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = ClientConfig::from_vars(&vars(&[
            (SOURCE_VERSION_VAR, "2.5.0"),
            (SOURCE_DIR_VAR, "/opt/envkey"),
            (FETCH_TIMEOUT_VAR, "1.5"),
        ]))
        .unwrap();

        assert_eq!(config.resolver_version, "2.5.0");
        assert_eq!(config.resolver_dir, PathBuf::from("/opt/envkey"));
        assert_eq!(config.fetch_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for raw in ["soon", "0", "-3", "NaN", "inf", "1e30"] {
            let err = ClientConfig::from_vars(&vars(&[(FETCH_TIMEOUT_VAR, raw)])).unwrap_err();
            assert!(
                matches!(err, Error::Configuration { .. }),
                "unexpected error for {raw}: {err}"
            );
        }
    }

    #[test]
    fn test_builder_rejects_blank_version() {
        let err = ClientConfig::builder()
            .resolver_version("  ")
            .resolver_dir("/tmp")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("resolver version"));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_process_environment() {
        let original = std::env::var(SOURCE_VERSION_VAR).ok();
        std::env::set_var(SOURCE_VERSION_VAR, "9.9.9");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.resolver_version, "9.9.9");

        match original {
            Some(value) => std::env::set_var(SOURCE_VERSION_VAR, value),
            None => std::env::remove_var(SOURCE_VERSION_VAR),
        }
    }
}
