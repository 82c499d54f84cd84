//! Local dotenv override file
//!
//! The file is read fresh on every fetch and never cached. It can supply the
//! credential (an `ENVKEY=` line), extra variables, or both.

use envkey_core::constants::ENVKEY_VAR;
use envkey_core::{EnvironmentVariables, Error, Result};
use std::path::{Path, PathBuf};

/// A parsed override file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideFile {
    path: PathBuf,
    vars: EnvironmentVariables,
}

impl OverrideFile {
    /// Read and parse `path`.
    ///
    /// A missing file, an unreadable file or any malformed line is an error;
    /// nothing is applied from a partially valid file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::override_file(path, "file does not exist"));
        }

        let iter = dotenv::from_path_iter(path)
            .map_err(|e| Error::override_file_with_source(path, "failed to open file", e))?;

        let mut vars = EnvironmentVariables::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                let message = match &e {
                    dotenv::Error::LineParse(line, index) => {
                        format!("malformed line '{line}' at offset {index}")
                    }
                    _ => "failed to parse file".to_string(),
                };
                Error::override_file_with_source(path, message, e)
            })?;
            vars.insert(key, value);
        }

        tracing::debug!(path = %path.display(), count = vars.len(), "read override file");
        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry, including `ENVKEY`
    #[must_use]
    pub fn vars(&self) -> &EnvironmentVariables {
        &self.vars
    }

    /// The `ENVKEY=` entry, if present and non-empty
    #[must_use]
    pub fn envkey(&self) -> Option<&str> {
        self.vars
            .get(ENVKEY_VAR)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// The file's variables minus the credential
    #[must_use]
    pub fn secrets(&self) -> EnvironmentVariables {
        let mut vars = self.vars.clone();
        vars.remove(ENVKEY_VAR);
        vars
    }
}
