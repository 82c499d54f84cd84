//! One-shot load at process start
//!
//! Hosts call [`autoload`] (or [`autoload_async`] from inside a runtime) once
//! during startup. It fetches with the ambient
//! credential and merges into the process environment, unless
//! `ENVKEY_DISABLE_AUTOLOAD` is set. Later calls are no-ops.

use crate::loader::{FetchRequest, Loader};
use crate::store::{EnvStore, OsEnvStore};
use envkey_core::constants::{DISABLE_AUTOLOAD_VAR, SHOULD_CACHE_VAR};
use envkey_core::{EnvironmentVariables, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide autoload flag
static PROCESS_AUTOLOAD: AutoloadState = AutoloadState::new();

/// What an autoload attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoloadOutcome {
    /// Fetched and merged; holds the variables that were set
    Loaded(EnvironmentVariables),
    /// `ENVKEY_DISABLE_AUTOLOAD` was set, nothing fetched
    Disabled,
    /// An earlier attempt already ran
    AlreadyRan,
}

impl AutoloadOutcome {
    /// Variables set by this attempt; empty unless `Loaded`
    #[must_use]
    pub fn into_set_vars(self) -> EnvironmentVariables {
        match self {
            AutoloadOutcome::Loaded(vars) => vars,
            AutoloadOutcome::Disabled | AutoloadOutcome::AlreadyRan => {
                EnvironmentVariables::new()
            }
        }
    }
}

/// `NotRun -> Ran`, switched atomically by the first attempt
#[derive(Debug, Default)]
pub struct AutoloadState {
    ran: AtomicBool,
}

impl AutoloadState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ran: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn has_run(&self) -> bool {
        self.ran.load(Ordering::Acquire)
    }

    /// Back to `NotRun`
    pub fn reset(&self) {
        self.ran.store(false, Ordering::Release);
    }

    /// Run the lifecycle against `env`.
    ///
    /// `loader` is only called when a fetch will actually happen. The state
    /// becomes `Ran` before any work starts, so a failed attempt is not
    /// retried by later calls; its error goes back to the caller. Fails
    /// inside an async runtime; use [`run_async`](Self::run_async) there.
    pub fn run<F>(&self, env: &mut dyn EnvStore, loader: F) -> Result<AutoloadOutcome>
    where
        F: FnOnce() -> Result<Loader>,
    {
        let request = match self.begin(&*env)? {
            Ok(request) => request,
            Err(outcome) => return Ok(outcome),
        };
        let set_vars = loader()?.load(env, request)?;
        Ok(AutoloadOutcome::Loaded(set_vars))
    }

    /// [`run`](Self::run) for hosts already inside an async runtime
    pub async fn run_async<F>(&self, env: &mut dyn EnvStore, loader: F) -> Result<AutoloadOutcome>
    where
        F: FnOnce() -> Result<Loader>,
    {
        let request = match self.begin(&*env)? {
            Ok(request) => request,
            Err(outcome) => return Ok(outcome),
        };
        let set_vars = loader()?.load_async(env, request).await?;
        Ok(AutoloadOutcome::Loaded(set_vars))
    }

    /// Flip to `Ran` and decide whether to fetch. `Err` carries the outcome
    /// when nothing should be fetched.
    fn begin(
        &self,
        env: &dyn EnvStore,
    ) -> Result<std::result::Result<FetchRequest, AutoloadOutcome>> {
        if self
            .ran
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("autoload already ran");
            return Ok(Err(AutoloadOutcome::AlreadyRan));
        }

        if env
            .get(DISABLE_AUTOLOAD_VAR)?
            .is_some_and(|value| !value.is_empty())
        {
            tracing::debug!("autoload disabled by {DISABLE_AUTOLOAD_VAR}");
            return Ok(Err(AutoloadOutcome::Disabled));
        }

        let cache = env.contains(SHOULD_CACHE_VAR)?;
        Ok(Ok(FetchRequest::new().cache(cache)))
    }
}

/// Load into the process environment once per process
pub fn autoload() -> Result<AutoloadOutcome> {
    PROCESS_AUTOLOAD.run(&mut OsEnvStore, Loader::from_env)
}

/// [`autoload`] for hosts running inside an async runtime
pub async fn autoload_async() -> Result<AutoloadOutcome> {
    PROCESS_AUTOLOAD
        .run_async(&mut OsEnvStore, Loader::from_env)
        .await
}
