use clap::Parser;
use envkey_config::ClientConfig;
use std::sync::Arc;

mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "envkey")]
#[command(about = "Load EnvKey secrets into the environment", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    envkey_utils::tracing::init()
        .map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;

    let cli = Cli::parse();
    let config = Arc::new(ClientConfig::from_env()?);

    cli.command.execute(config).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_flags() {
        let cli = Cli::try_parse_from([
            "envkey",
            "fetch",
            "--envkey",
            "ekAbc-host",
            "--no-cache",
            "--permitted",
            "A,B",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                envkey,
                cache,
                no_cache,
                permitted,
                ..
            } => {
                assert_eq!(envkey.as_deref(), Some("ekAbc-host"));
                assert!(!cache);
                assert!(no_cache);
                assert_eq!(permitted, vec!["A".to_string(), "B".to_string()]);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_cache_flags_conflict() {
        assert!(Cli::try_parse_from(["envkey", "fetch", "--cache", "--no-cache"]).is_err());
    }

    #[test]
    fn test_exec_passes_trailing_args() {
        let cli = Cli::try_parse_from([
            "envkey", "exec", "--cache", "--", "printenv", "-0", "TEST",
        ])
        .unwrap();

        match cli.command {
            Commands::Exec {
                cache,
                command,
                args,
                ..
            } => {
                assert!(cache);
                assert_eq!(command, "printenv");
                assert_eq!(args, vec!["-0".to_string(), "TEST".to_string()]);
            }
            _ => panic!("expected exec"),
        }
    }
}
