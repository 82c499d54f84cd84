//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for envkey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for envkey operations using thiserror
///
/// Every variant is terminal for the call that produced it; nothing in the
/// workspace retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The running OS/CPU has no resolver build
    UnsupportedPlatform {
        os: String,
        arch: String,
        message: String,
    },

    /// No credential in the argument, the environment or the override file
    MissingCredential { message: String },

    /// The resolver could not be launched, exited non-zero or timed out
    FetchFailed {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    /// The resolver explicitly rejected the credential
    InvalidCredential { message: String },

    /// The resolver output was not a flat JSON object of strings
    MalformedResponse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A requested override file is missing, unreadable or malformed
    OverrideFile {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Environment variable related errors
    Environment { variable: String, message: String },

    /// Command execution errors
    CommandExecution {
        command: String,
        args: Vec<String>,
        message: String,
        exit_code: Option<i32>,
    },

    /// Configuration errors
    Configuration { message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Operation timeout errors
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },
}
