use clap::Subcommand;
use envkey_config::ClientConfig;
use envkey_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub mod exec;
pub mod fetch;
pub mod locate;

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch secrets and print them as JSON
    Fetch {
        /// Credential to use instead of ENVKEY
        #[arg(long)]
        envkey: Option<String>,

        /// Let the resolver use its local cache
        #[arg(long, conflicts_with = "no_cache")]
        cache: bool,

        /// Never use the resolver's local cache, even if ENVKEY_SHOULD_CACHE is set
        #[arg(long)]
        no_cache: bool,

        /// Let the resolver use its in-memory cache
        #[arg(long)]
        mem_cache: bool,

        /// Dotenv file with local overrides (may hold ENVKEY itself)
        #[arg(long = "env-file", value_name = "PATH")]
        env_file: Option<PathBuf>,

        /// Only print these variables (comma separated)
        #[arg(long, value_delimiter = ',')]
        permitted: Vec<String>,
    },

    /// Load secrets into the environment, then run a command
    Exec {
        /// Let the resolver use its local cache
        #[arg(long)]
        cache: bool,

        /// Dotenv file with local overrides (may hold ENVKEY itself)
        #[arg(long = "env-file", value_name = "PATH")]
        env_file: Option<PathBuf>,

        /// Command to run
        command: String,

        /// Arguments for the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the resolver path for this platform
    Locate,
}

impl Commands {
    pub async fn execute(self, config: Arc<ClientConfig>) -> Result<()> {
        match self {
            Commands::Fetch {
                envkey,
                cache,
                no_cache,
                mem_cache,
                env_file,
                permitted,
            } => {
                let cache = cache_flag(cache, no_cache);
                fetch::execute(config, envkey, cache, mem_cache, env_file, permitted).await
            }
            Commands::Exec {
                cache,
                env_file,
                command,
                args,
            } => {
                exec::execute(config, cache.then_some(true), env_file, command, args).await
            }
            Commands::Locate => locate::execute(config),
        }
    }
}

/// `None` when neither flag was given, deferring to `ENVKEY_SHOULD_CACHE`
fn cache_flag(cache: bool, no_cache: bool) -> Option<bool> {
    match (cache, no_cache) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
