//! The `ENVKEY` credential

use crate::errors::{Error, Result};
use std::fmt;

/// Number of leading characters shown when a credential is logged
const VISIBLE_PREFIX: usize = 4;

/// Opaque identity string granting access to one secret bundle.
///
/// Shaped `<access-part>-<host-or-org-part>`, though only non-emptiness is
/// enforced here; the resolver is the judge of validity. `Debug` and
/// `Display` redact everything past a short prefix.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a credential, rejecting empty or whitespace-only input
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::missing_credential("ENVKEY is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw credential, for handing to the resolver process only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Redacted form safe for logs
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}****")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}
