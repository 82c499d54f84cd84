//! The `fetch`/`load` surface
//!
//! A [`Loader`] ties configuration, credential resolution, the override file
//! and the fetch client together. Every call reads the override file afresh
//! and spawns the resolver at most once; nothing is cached between calls.

use crate::merge::merge;
use crate::store::EnvStore;
use envkey_config::ClientConfig;
use envkey_core::constants::{ENVKEY_VAR, SHOULD_CACHE_VAR};
use envkey_core::{EnvironmentVariables, Error, Result};
use envkey_source::{resolve, FetchOptions, OverrideFile, ResolvedSecrets, SecretFetchClient};
use envkey_utils::run_async;
use std::path::{Path, PathBuf};

/// Per-call parameters for [`Loader::fetch`] and [`Loader::load`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Takes priority over `ENVKEY` in the environment and the override file
    pub credential: Option<String>,
    /// `None` defers to `ENVKEY_SHOULD_CACHE`
    pub cache_enabled: Option<bool>,
    pub override_file: Option<PathBuf>,
    pub mem_cache: bool,
    pub cwd: Option<PathBuf>,
    pub permitted: Option<Vec<String>>,
}

impl FetchRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    #[must_use]
    pub fn credential_opt(mut self, credential: Option<&str>) -> Self {
        self.credential = credential.map(str::to_string);
        self
    }

    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn cache_opt(mut self, enabled: Option<bool>) -> Self {
        self.cache_enabled = enabled;
        self
    }

    #[must_use]
    pub fn override_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn override_file_opt(mut self, path: Option<&Path>) -> Self {
        self.override_file = path.map(Path::to_path_buf);
        self
    }

    #[must_use]
    pub fn mem_cache(mut self, enabled: bool) -> Self {
        self.mem_cache = enabled;
        self
    }

    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn permitted(mut self, names: Vec<String>) -> Self {
        self.permitted = Some(names);
        self
    }
}

/// Resolves, fetches and merges secrets
pub struct Loader {
    config: ClientConfig,
    client: SecretFetchClient,
}

impl Loader {
    /// Loader for the resolver this platform needs, per `config`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let binary = envkey_source::locate(&config.resolver_dir, &config.resolver_version)?;
        Ok(Self::with_client(config, SecretFetchClient::new(binary)))
    }

    /// Loader configured from the process environment
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Loader with a preconfigured client
    pub fn with_client(config: ClientConfig, client: SecretFetchClient) -> Self {
        Self { config, client }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        self.client.binary()
    }

    /// Resolve the credential and fetch, leaving `env` untouched.
    ///
    /// With no credential anywhere but a non-empty override file, the file's
    /// variables are returned as is and the resolver is not run.
    pub async fn fetch_async(
        &self,
        env: &dyn EnvStore,
        request: FetchRequest,
    ) -> Result<ResolvedSecrets> {
        let override_file = request
            .override_file
            .as_deref()
            .map(OverrideFile::read)
            .transpose()?;

        let from_env = env.get(ENVKEY_VAR)?;
        let resolved = match resolve(
            request.credential.as_deref(),
            from_env.as_deref(),
            override_file.as_ref(),
        ) {
            Ok(resolved) => resolved,
            Err(e) if e.is_missing_credential() => {
                return override_only(override_file, &request, e);
            }
            Err(e) => return Err(e),
        };

        let cache = match request.cache_enabled {
            Some(enabled) => enabled,
            None => self.config.cache_by_default || env.contains(SHOULD_CACHE_VAR)?,
        };

        let mut options = FetchOptions::from_config(&self.config)
            .with_cache(cache)
            .with_mem_cache(request.mem_cache);
        if let Some(path) = request.override_file {
            options = options.with_override_file(path);
        }
        if let Some(cwd) = request.cwd {
            options = options.with_cwd(cwd);
        }
        if let Some(permitted) = request.permitted {
            options = options.with_permitted(permitted);
        }

        let snapshot = env.snapshot()?;
        self.client
            .fetch(&resolved.credential, &options, snapshot)
            .await
    }

    /// Fetch, then merge into `env` without overwriting. Returns the
    /// variables that were actually set.
    pub async fn load_async(
        &self,
        env: &mut dyn EnvStore,
        request: FetchRequest,
    ) -> Result<EnvironmentVariables> {
        let secrets = self.fetch_async(&*env, request).await?;
        merge(&secrets, env)
    }

    /// Blocking [`fetch_async`](Self::fetch_async); fails inside an async runtime
    pub fn fetch(&self, env: &dyn EnvStore, request: FetchRequest) -> Result<ResolvedSecrets> {
        run_async(self.fetch_async(env, request))
    }

    /// Blocking [`load_async`](Self::load_async); fails inside an async runtime
    pub fn load(
        &self,
        env: &mut dyn EnvStore,
        request: FetchRequest,
    ) -> Result<EnvironmentVariables> {
        run_async(self.load_async(env, request))
    }
}

fn override_only(
    override_file: Option<OverrideFile>,
    request: &FetchRequest,
    missing: Error,
) -> Result<ResolvedSecrets> {
    let Some(file) = override_file else {
        return Err(missing);
    };

    let mut vars = file.secrets();
    if vars.is_empty() {
        return Err(missing);
    }
    if let Some(permitted) = &request.permitted {
        vars.retain_permitted(permitted.as_slice());
    }

    tracing::info!(
        path = %file.path().display(),
        count = vars.len(),
        "no ENVKEY found, using override file variables only"
    );
    Ok(ResolvedSecrets::from(vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEnvStore;
    use envkey_source::{TestCommandExecutor, TestResponse};
    use std::io::Write;

    const BINARY: &str = "/opt/ext/envkey-source_2.4.1_linux_amd64/envkey-source";
    const VALID_ENVKEY: &str = "ekAc8p6PiPp1Di7nQu5vGomx-qXknocWWVYqyVMaxaBco12";
    const INVALID_ENVKEY: &str = "ekunDrefdPeELwPpupdzJpsz-2Hs3HCiscoY1TfGinvalid";

    fn loader(response: TestResponse) -> (Loader, TestCommandExecutor) {
        let executor = TestCommandExecutor::new();
        executor.add_command_response(BINARY, response);

        let config = ClientConfig::builder()
            .resolver_dir("/opt/ext")
            .client_version("0.1.0")
            .build()
            .unwrap();
        let client = SecretFetchClient::with_executor(BINARY, Box::new(executor.clone()));
        (Loader::with_client(config, client), executor)
    }

    fn valid_response() -> TestResponse {
        TestResponse::success(r#"{"TEST":"it","TEST_2":"works!"}"#)
    }

    fn dotenv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_with_valid_credential() {
        let (loader, executor) = loader(valid_response());
        let mut env = MemoryEnvStore::new().with_var(ENVKEY_VAR, VALID_ENVKEY);

        let set = loader.load(&mut env, FetchRequest::new()).unwrap();

        assert_eq!(set.get("TEST").map(String::as_str), Some("it"));
        assert_eq!(set.get("TEST_2").map(String::as_str), Some("works!"));
        assert_eq!(env.get("TEST").unwrap().as_deref(), Some("it"));
        assert_eq!(executor.invocation_count(), 1);
    }

    #[test]
    fn test_invalid_credential_fails_closed() {
        let (loader, _) = loader(TestResponse::success("error: ENVKEY invalid"));
        let mut env = MemoryEnvStore::new();

        let err = loader
            .load(&mut env, FetchRequest::new().credential(INVALID_ENVKEY))
            .unwrap_err();

        assert!(err.is_invalid_credential());
        assert!(env.vars().is_empty());
    }

    #[test]
    fn test_missing_credential_never_spawns() {
        let (loader, executor) = loader(valid_response());
        let env = MemoryEnvStore::new().with_var(ENVKEY_VAR, "");

        let err = loader.fetch(&env, FetchRequest::new()).unwrap_err();

        assert!(err.is_missing_credential());
        assert_eq!(executor.invocation_count(), 0);
    }

    #[test]
    fn test_override_file_alone_supplies_variables() {
        let (loader, executor) = loader(valid_response());
        let file = dotenv_file("TEST=it\nTEST_2=works!\n");
        let mut env = MemoryEnvStore::new();

        let set = loader
            .load(&mut env, FetchRequest::new().override_file(file.path()))
            .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(env.get("TEST_2").unwrap().as_deref(), Some("works!"));
        assert_eq!(executor.invocation_count(), 0);
    }

    #[test]
    fn test_missing_override_file_is_fatal() {
        let (loader, executor) = loader(valid_response());
        let dir = tempfile::tempdir().unwrap();
        let env = MemoryEnvStore::new().with_var(ENVKEY_VAR, VALID_ENVKEY);

        let err = loader
            .fetch(&env, FetchRequest::new().override_file(dir.path().join("missing.env")))
            .unwrap_err();

        assert!(matches!(err, Error::OverrideFile { .. }));
        assert_eq!(executor.invocation_count(), 0);
    }

    #[test]
    fn test_override_file_credential_is_used() {
        let (loader, executor) = loader(valid_response());
        let file = dotenv_file(&format!("ENVKEY={VALID_ENVKEY}\nLOCAL=1\n"));
        let env = MemoryEnvStore::new();

        loader
            .fetch(&env, FetchRequest::new().override_file(file.path()))
            .unwrap();

        let calls = executor.invocations();
        assert_eq!(calls.len(), 1);
        let child_env = &calls[0].env;
        assert_eq!(child_env.get(ENVKEY_VAR).map(String::as_str), Some(VALID_ENVKEY));
        let expected_path = file.path().to_string_lossy().into_owned();
        assert_eq!(
            calls[0].args.value_of("--dotenv-file"),
            Some(expected_path.as_str())
        );
    }

    #[test]
    fn test_cache_follows_should_cache_presence() {
        let (loader, executor) = loader(valid_response());
        let env = MemoryEnvStore::new()
            .with_var(ENVKEY_VAR, VALID_ENVKEY)
            .with_var(SHOULD_CACHE_VAR, "");

        loader.fetch(&env, FetchRequest::new()).unwrap();
        loader.fetch(&env, FetchRequest::new().cache(false)).unwrap();

        let calls = executor.invocations();
        assert!(calls[0].args.contains("--cache"));
        assert!(!calls[1].args.contains("--cache"));
    }

    #[test]
    fn test_explicit_credential_beats_environment() {
        let (loader, executor) = loader(valid_response());
        let env = MemoryEnvStore::new().with_var(ENVKEY_VAR, INVALID_ENVKEY);

        loader
            .fetch(&env, FetchRequest::new().credential(VALID_ENVKEY))
            .unwrap();

        let calls = executor.invocations();
        let child_env = &calls[0].env;
        assert_eq!(child_env.get(ENVKEY_VAR).map(String::as_str), Some(VALID_ENVKEY));
    }

    #[test]
    fn test_empty_permitted_list_does_not_filter() {
        let (loader, _) = loader(valid_response());
        let env = MemoryEnvStore::new().with_var(ENVKEY_VAR, VALID_ENVKEY);

        let secrets = loader
            .fetch(&env, FetchRequest::new().permitted(Vec::new()))
            .unwrap();
        assert_eq!(secrets.len(), 2);

        let file = dotenv_file("TEST=it\nTEST_2=works!\n");
        let secrets = loader
            .fetch(
                &MemoryEnvStore::new(),
                FetchRequest::new()
                    .override_file(file.path())
                    .permitted(Vec::new()),
            )
            .unwrap();
        assert_eq!(secrets.len(), 2);
    }

    #[tokio::test]
    async fn test_async_variant_inside_runtime() {
        let (loader, _) = loader(valid_response());
        let env = MemoryEnvStore::new().with_var(ENVKEY_VAR, VALID_ENVKEY);

        let secrets = loader.fetch_async(&env, FetchRequest::new()).await.unwrap();
        assert_eq!(secrets.len(), 2);

        let err = loader.fetch(&env, FetchRequest::new()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
