//! Loading resolved secrets into the process environment
//!
//! The free functions here are the usual entry points: they read
//! configuration from the environment, locate the resolver for this platform
//! and work against the real process environment. [`Loader`] and the
//! [`EnvStore`] implementations are there for callers that need control over
//! either.

pub mod autoload;
pub mod loader;
pub mod merge;
pub mod store;

pub use autoload::{autoload, autoload_async, AutoloadOutcome, AutoloadState};
pub use loader::{FetchRequest, Loader};
pub use merge::merge;
pub use store::{EnvStore, MemoryEnvStore, OsEnvStore};

use envkey_core::{EnvironmentVariables, Result};
use envkey_source::ResolvedSecrets;
use std::path::Path;

/// Fetch secrets without touching the process environment
pub fn fetch(
    credential: Option<&str>,
    cache_enabled: Option<bool>,
    override_file: Option<&Path>,
) -> Result<ResolvedSecrets> {
    let loader = Loader::from_env()?;
    let request = FetchRequest::new()
        .credential_opt(credential)
        .cache_opt(cache_enabled)
        .override_file_opt(override_file);
    loader.fetch(&OsEnvStore, request)
}

/// Fetch and merge into the process environment, returning what was set
pub fn load(
    cache_enabled: Option<bool>,
    override_file: Option<&Path>,
) -> Result<EnvironmentVariables> {
    let loader = Loader::from_env()?;
    let request = FetchRequest::new()
        .cache_opt(cache_enabled)
        .override_file_opt(override_file);
    loader.load(&mut OsEnvStore, request)
}

/// Read one variable from the process environment
pub fn get(name: &str) -> Result<Option<String>> {
    OsEnvStore.get(name)
}
