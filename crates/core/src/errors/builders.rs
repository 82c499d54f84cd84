//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create an unsupported platform error
    #[must_use]
    pub fn unsupported_platform(
        os: impl Into<String>,
        arch: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::UnsupportedPlatform {
            os: os.into(),
            arch: arch.into(),
            message: message.into(),
        }
    }

    /// Create a missing credential error
    #[must_use]
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Error::MissingCredential {
            message: message.into(),
        }
    }

    /// Create a fetch failure
    #[must_use]
    pub fn fetch_failed(
        command: impl Into<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Error::FetchFailed {
            command: command.into(),
            message: message.into(),
            exit_code,
        }
    }

    /// Create an invalid credential error
    #[must_use]
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Error::InvalidCredential {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    #[must_use]
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a malformed response error from a JSON decoding failure
    #[must_use]
    pub fn malformed_response_with_source(
        message: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        Error::MalformedResponse {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an override file error
    #[must_use]
    pub fn override_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::OverrideFile {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an override file error with a source error
    #[must_use]
    pub fn override_file_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::OverrideFile {
            path: path.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an environment variable error
    #[must_use]
    pub fn environment(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Environment {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Create a command execution error
    #[must_use]
    pub fn command_execution(
        command: impl Into<String>,
        args: Vec<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Error::CommandExecution {
            command: command.into(),
            args,
            message: message.into(),
            exit_code,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: std::time::Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether the resolver refused the credential itself
    #[must_use]
    pub fn is_invalid_credential(&self) -> bool {
        matches!(self, Error::InvalidCredential { .. })
    }

    /// Whether no credential could be found anywhere
    #[must_use]
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Error::MissingCredential { .. })
    }
}
