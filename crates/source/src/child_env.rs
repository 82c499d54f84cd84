//! Environment handed to the resolver process

use envkey_core::constants::ENVKEY_VAR;
use envkey_core::{Credential, EnvironmentVariables};

/// Builder for the resolver's environment.
///
/// Starts from a snapshot of the current environment and applies overrides.
/// The finished map replaces the child's environment wholesale, so nothing
/// the caller did not put in the snapshot leaks through.
#[derive(Debug, Clone, Default)]
pub struct ChildEnvironment {
    vars: EnvironmentVariables,
}

impl ChildEnvironment {
    #[must_use]
    pub fn from_snapshot(snapshot: EnvironmentVariables) -> Self {
        Self { vars: snapshot }
    }

    /// Set or replace one variable
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key, value);
        self
    }

    /// Set `ENVKEY`, replacing whatever the snapshot held
    #[must_use]
    pub fn with_credential(self, credential: &Credential) -> Self {
        self.with_var(ENVKEY_VAR, credential.expose())
    }

    #[must_use]
    pub fn build(self) -> EnvironmentVariables {
        self.vars
    }
}
