use envkey_config::ClientConfig;
use envkey_core::{Error, Result};
use envkey_env::{FetchRequest, Loader, OsEnvStore};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn execute(
    config: Arc<ClientConfig>,
    cache: Option<bool>,
    env_file: Option<PathBuf>,
    command: String,
    args: Vec<String>,
) -> Result<()> {
    let loader = Loader::new(ClientConfig::clone(&config))?;
    let request = FetchRequest::new()
        .cache_opt(cache)
        .override_file_opt(env_file.as_deref());

    // Values already in our environment win over fetched ones
    let set_vars = loader.load_async(&mut OsEnvStore, request).await?;
    tracing::info!(count = set_vars.len(), %command, "running command with loaded environment");

    let status = tokio::process::Command::new(&command)
        .args(&args)
        .status()
        .await
        .map_err(|e| {
            Error::command_execution(&command, args.clone(), format!("failed to start: {e}"), None)
        })?;

    std::process::exit(status.code().unwrap_or(1));
}
