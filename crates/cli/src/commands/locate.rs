use envkey_config::ClientConfig;
use envkey_core::Result;
use std::sync::Arc;

pub fn execute(config: Arc<ClientConfig>) -> Result<()> {
    let path = envkey_source::locate(&config.resolver_dir, &config.resolver_version)?;
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "resolver binary not found");
    }
    println!("{}", path.display());
    Ok(())
}
