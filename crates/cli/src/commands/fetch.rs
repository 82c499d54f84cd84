use envkey_config::ClientConfig;
use envkey_core::Result;
use envkey_env::{FetchRequest, Loader, OsEnvStore};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn execute(
    config: Arc<ClientConfig>,
    envkey: Option<String>,
    cache: Option<bool>,
    mem_cache: bool,
    env_file: Option<PathBuf>,
    permitted: Vec<String>,
) -> Result<()> {
    let loader = Loader::new(ClientConfig::clone(&config))?;

    let mut request = FetchRequest::new()
        .credential_opt(envkey.as_deref())
        .cache_opt(cache)
        .override_file_opt(env_file.as_deref())
        .mem_cache(mem_cache);
    if !permitted.is_empty() {
        request = request.permitted(permitted);
    }

    let secrets = loader.fetch_async(&OsEnvStore, request).await?;
    println!("{}", serde_json::to_string_pretty(&secrets.sorted())?);
    Ok(())
}
