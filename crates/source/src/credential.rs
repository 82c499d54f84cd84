//! Credential priority
//!
//! Explicit argument, then the process `ENVKEY`, then the override file's
//! `ENVKEY=` line. Empty values count as absent at every level.

use crate::override_file::OverrideFile;
use envkey_core::constants::ENVKEY_VAR;
use envkey_core::{Credential, Error, Result};
use std::fmt;

/// Where a credential was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Environment,
    OverrideFile,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialSource::Explicit => "argument",
            CredentialSource::Environment => "environment",
            CredentialSource::OverrideFile => "override file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

/// Pick the highest-priority non-empty credential.
///
/// `environment` is the current value of `ENVKEY` in the process
/// environment, if any.
pub fn resolve(
    explicit: Option<&str>,
    environment: Option<&str>,
    override_file: Option<&OverrideFile>,
) -> Result<ResolvedCredential> {
    let candidates = [
        (explicit, CredentialSource::Explicit),
        (environment, CredentialSource::Environment),
        (
            override_file.and_then(OverrideFile::envkey),
            CredentialSource::OverrideFile,
        ),
    ];

    for (value, source) in candidates {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let credential = Credential::new(value)?;
        tracing::debug!(%credential, %source, "resolved credential");
        return Ok(ResolvedCredential { credential, source });
    }

    Err(Error::missing_credential(format!(
        "set {ENVKEY_VAR} in the environment, pass it explicitly, or add it to an override file"
    )))
}
