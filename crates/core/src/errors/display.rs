//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedPlatform { os, arch, message } => {
                write!(f, "unsupported platform '{os}/{arch}': {message}")
            }
            Error::MissingCredential { message } => {
                write!(f, "missing ENVKEY: {message}")
            }
            Error::FetchFailed {
                command,
                message,
                exit_code,
            } => match exit_code {
                Some(code) => write!(
                    f,
                    "fetch via '{command}' failed with exit code {code}: {message}"
                ),
                None => write!(f, "fetch via '{command}' failed: {message}"),
            },
            Error::InvalidCredential { message } => {
                write!(f, "invalid ENVKEY: {message}")
            }
            Error::MalformedResponse { message, .. } => {
                write!(f, "malformed resolver response: {message}")
            }
            Error::OverrideFile { path, message, .. } => {
                write!(f, "override file '{}': {}", path.display(), message)
            }
            Error::Environment { variable, message } => {
                write!(f, "environment variable '{variable}' error: {message}")
            }
            Error::CommandExecution {
                command,
                args,
                message,
                exit_code,
            } => {
                let args_str = args.join(" ");
                let invocation = if args_str.is_empty() {
                    command.clone()
                } else {
                    format!("{command} {args_str}")
                };
                match exit_code {
                    Some(code) => write!(
                        f,
                        "command '{invocation}' failed with exit code {code}: {message}"
                    ),
                    None => write!(f, "command '{invocation}' failed: {message}"),
                }
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fetch_failed_display_includes_exit_code() {
        let err = Error::fetch_failed("envkey-source", "boom", Some(2));
        assert_eq!(
            err.to_string(),
            "fetch via 'envkey-source' failed with exit code 2: boom"
        );

        let err = Error::fetch_failed("envkey-source", "not found", None);
        assert_eq!(err.to_string(), "fetch via 'envkey-source' failed: not found");
    }

    #[test]
    fn test_command_execution_display_without_args() {
        let err = Error::command_execution("true", vec![], "killed", None);
        assert_eq!(err.to_string(), "command 'true' failed: killed");

        let err = Error::command_execution(
            "envkey-source",
            vec!["--json".to_string()],
            "exited",
            Some(1),
        );
        assert_eq!(
            err.to_string(),
            "command 'envkey-source --json' failed with exit code 1: exited"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::timeout("envkey-source", Duration::from_secs(3));
        assert_eq!(err.to_string(), "operation 'envkey-source' timed out after 3s");
    }

    #[test]
    fn test_override_file_display() {
        let err = Error::override_file("/tmp/.env", "no such file");
        assert_eq!(err.to_string(), "override file '/tmp/.env': no such file");
    }

    #[test]
    fn test_file_system_display() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::file_system("/usr/bin/host", "current_exe", source);
        assert_eq!(
            err.to_string(),
            "file system current_exe operation failed for '/usr/bin/host': gone"
        );
    }
}
