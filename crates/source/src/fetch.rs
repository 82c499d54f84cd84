//! Secret fetch client
//!
//! Runs the resolver once per call and decodes its JSON output. The resolver
//! does all cryptography, networking and caching; this side only builds the
//! command line, hands over the credential through the child's environment
//! and classifies what comes back.

use crate::child_env::ChildEnvironment;
use crate::command_executor::{CommandExecutor, CommandExecutorFactory, ExecutionOptions};
use envkey_config::ClientConfig;
use envkey_core::constants::{
    ERROR_SENTINEL, FLAG_CACHE, FLAG_CLIENT_NAME, FLAG_CLIENT_VERSION, FLAG_DOTENV_FILE,
    FLAG_JSON, FLAG_MEM_CACHE, INVALID_KEY_MESSAGE,
};
use envkey_core::{CommandArguments, Credential, EnvironmentVariables, Error, Result};
use envkey_utils::tracing::fetch_span;
use serde::Serialize;
use serde_json::Value;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tracing::Instrument;

/// Options for one fetch, passed by value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Let the resolver use its on-disk cache (`--cache`)
    pub cache: bool,
    /// Let the resolver use its in-memory cache (`--mem-cache`)
    pub mem_cache: bool,
    pub client_name: String,
    pub client_version: String,
    /// Dotenv file the resolver overlays on its result (`--dotenv-file`)
    pub override_file: Option<PathBuf>,
    /// Working directory for the resolver
    pub cwd: Option<PathBuf>,
    /// Kill the resolver after this long; wait forever when `None`
    pub timeout: Option<Duration>,
    /// Keep only these variable names
    pub permitted: Option<Vec<String>>,
}

impl FetchOptions {
    /// Options seeded from the client configuration
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            cache: config.cache_by_default,
            client_name: config.client_name.clone(),
            client_version: config.client_version.clone(),
            timeout: config.fetch_timeout,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_mem_cache(mut self, mem_cache: bool) -> Self {
        self.mem_cache = mem_cache;
        self
    }

    #[must_use]
    pub fn with_override_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn with_permitted(mut self, names: Vec<String>) -> Self {
        self.permitted = Some(names);
        self
    }

    /// `--json --client-name <n> --client-version <v> [--cache] [--mem-cache] [--dotenv-file <p>]`
    #[must_use]
    pub fn to_arguments(&self) -> CommandArguments {
        let mut args = CommandArguments::new();
        args.push(FLAG_JSON);
        args.push_flag(FLAG_CLIENT_NAME, &self.client_name);
        args.push_flag(FLAG_CLIENT_VERSION, &self.client_version);
        if self.cache {
            args.push(FLAG_CACHE);
        }
        if self.mem_cache {
            args.push(FLAG_MEM_CACHE);
        }
        if let Some(path) = &self.override_file {
            args.push_flag(FLAG_DOTENV_FILE, path.to_string_lossy());
        }
        args
    }

    fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions {
            cwd: self.cwd.clone(),
            timeout: self.timeout,
        }
    }
}

/// Decoded resolver output: variable name to value, `null`s already dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSecrets(EnvironmentVariables);

impl ResolvedSecrets {
    #[must_use]
    pub fn into_vars(self) -> EnvironmentVariables {
        self.0
    }
}

impl Deref for ResolvedSecrets {
    type Target = EnvironmentVariables;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<EnvironmentVariables> for ResolvedSecrets {
    fn from(vars: EnvironmentVariables) -> Self {
        Self(vars)
    }
}

/// Runs the resolver binary and decodes its answer
pub struct SecretFetchClient {
    binary: PathBuf,
    executor: Box<dyn CommandExecutor>,
}

impl SecretFetchClient {
    /// Client for `binary` using the system command executor
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self::with_executor(binary, CommandExecutorFactory::system())
    }

    /// Client for `binary` using a custom executor
    pub fn with_executor(binary: impl Into<PathBuf>, executor: Box<dyn CommandExecutor>) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Invoke the resolver once.
    ///
    /// `environment` is the snapshot the child starts from; `ENVKEY` in it is
    /// replaced by `credential`. There is no retry: every failure is returned
    /// to the caller as is.
    pub async fn fetch(
        &self,
        credential: &Credential,
        options: &FetchOptions,
        environment: EnvironmentVariables,
    ) -> Result<ResolvedSecrets> {
        let command = self.binary.to_string_lossy().into_owned();
        let args = options.to_arguments();
        let env = ChildEnvironment::from_snapshot(environment)
            .with_credential(credential)
            .build();

        tracing::debug!(
            binary = %command,
            args = %args,
            %credential,
            "invoking resolver"
        );

        let output = self
            .executor
            .execute_with_env(&command, &args, env, &options.execution_options())
            .instrument(fetch_span(&command))
            .await
            .map_err(|e| match e {
                Error::Timeout { duration, .. } => Error::fetch_failed(
                    &command,
                    format!("resolver did not finish within {duration:?} and was killed"),
                    None,
                ),
                other => Error::fetch_failed(&command, other.to_string(), None),
            })?;

        if !output.status.success() {
            let message = diagnostics(&output);
            tracing::error!(
                binary = %command,
                exit_code = ?output.status.code(),
                "{message}"
            );
            return Err(Error::fetch_failed(&command, message, output.status.code()));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            Error::malformed_response(format!("resolver output is not valid UTF-8: {e}"))
        })?;

        let mut vars = decode_response(&stdout)?.into_vars();
        if let Some(permitted) = &options.permitted {
            vars.retain_permitted(permitted.as_slice());
        }

        tracing::debug!(count = vars.len(), "resolver returned variables");
        Ok(ResolvedSecrets::from(vars))
    }
}

/// Classify and decode the stdout of a successful resolver run
pub fn decode_response(stdout: &str) -> Result<ResolvedSecrets> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_credential(INVALID_KEY_MESSAGE));
    }

    if let Some(rest) = trimmed.strip_prefix(ERROR_SENTINEL) {
        let message = rest.trim();
        return Err(Error::invalid_credential(if message.is_empty() {
            INVALID_KEY_MESSAGE
        } else {
            message
        }));
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| {
        Error::malformed_response_with_source("resolver output is not valid JSON", e)
    })?;

    let map = match value {
        Value::Null => return Err(Error::invalid_credential(INVALID_KEY_MESSAGE)),
        Value::Object(map) => map,
        other => {
            return Err(Error::malformed_response(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut vars = EnvironmentVariables::new();
    for (key, value) in map {
        if key.is_empty() {
            return Err(Error::malformed_response("variable name is empty"));
        }
        match value {
            Value::String(s) => {
                vars.insert(key, s);
            }
            Value::Null => tracing::trace!(%key, "skipping null value"),
            other => {
                return Err(Error::malformed_response(format!(
                    "value for '{key}' is {}, expected a string",
                    json_kind(&other)
                )))
            }
        }
    }

    Ok(ResolvedSecrets(vars))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The child's complaint: stderr, or stdout when stderr is empty
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    clean_diagnostics(&text)
}

/// Strip the `echo 'error: ...'; false` shell wrapper the resolver emits
fn clean_diagnostics(text: &str) -> String {
    text.replace("echo 'error: ", "")
        .replace("'; false", "")
        .trim()
        .to_string()
}
