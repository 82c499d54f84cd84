//! Environment merge engine

use crate::store::EnvStore;
use envkey_core::{EnvironmentVariables, Result};
use envkey_source::ResolvedSecrets;

/// Apply `secrets` to `env` without overwriting anything already there.
///
/// Returns exactly the variables that were written. Keys present in `env`,
/// including those with empty values, are left alone. The outcome does not
/// depend on iteration order. Concurrent merges into the same store must be
/// serialised by the caller.
pub fn merge(secrets: &ResolvedSecrets, env: &mut dyn EnvStore) -> Result<EnvironmentVariables> {
    let mut set_vars = EnvironmentVariables::new();
    let mut skipped = 0usize;

    for (key, value) in secrets.iter() {
        if env.set_if_absent(key, value)? {
            set_vars.insert(key.clone(), value.clone());
        } else {
            tracing::trace!(%key, "already set, keeping existing value");
            skipped += 1;
        }
    }

    tracing::info!(set = set_vars.len(), skipped, "merged resolved variables");
    Ok(set_vars)
}
