//! tasklist-server: hosts the `count-todos` function over HTTP.
//!
//! `serve` talks to the hosted store and authentication provider; `dev`
//! runs against an in-memory store with a fixed token table.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tasklist::server::auth::{MockValidator, RemoteTokenValidator};
use tasklist::server::config::ServiceConfig;
use tasklist::server::{http, CountService};
use tasklist::store::{InMemoryTaskStore, RestStoreConfig, RestTaskStore, TaskStore};
use tasklist::types::NewTask;
use url::Url;

/// Authenticated task-count endpoint
#[derive(Parser)]
#[command(name = "tasklist-server")]
#[command(about = "Serve the count-todos function", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve against the hosted store
    ///
    /// Settings come from --config if given, otherwise from TASKLIST_*
    /// environment variables. Flags override either source.
    Serve {
        /// TOML configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Serve against an in-memory store
    ///
    /// Tokens are given as TOKEN=USER pairs; tasks as USER:TEXT pairs.
    Dev {
        /// Accepted bearer token and the user it resolves to
        #[arg(long = "token", value_name = "TOKEN=USER", required = true)]
        tokens: Vec<String>,

        /// Task to preload, prefix with '+' to mark it completed
        #[arg(long = "task", value_name = "USER:TEXT")]
        tasks: Vec<String>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args)]
struct Overrides {
    /// Listen address
    #[arg(long, env = "TASKLIST_BIND")]
    bind: Option<SocketAddr>,

    /// Route the function is served on
    #[arg(long, env = "TASKLIST_FUNCTION_PATH")]
    function_path: Option<String>,

    /// Outbound request timeout in seconds
    #[arg(long, env = "TASKLIST_REQUEST_TIMEOUT_SECS")]
    timeout: Option<u64>,
}

impl Overrides {
    /// Apply flag and env overrides, then re-check the result.
    fn apply(self, mut config: ServiceConfig) -> Result<ServiceConfig> {
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(path) = self.function_path {
            config.function_path = path;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = secs;
        }
        config.validate().context("invalid configuration override")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tasklist::init_logging();

    match Cli::parse().command {
        Commands::Serve { config, overrides } => serve(config, overrides).await,
        Commands::Dev {
            tokens,
            tasks,
            overrides,
        } => dev(tokens, tasks, overrides).await,
    }
}

async fn serve(path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let loaded = match path {
        Some(path) => ServiceConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServiceConfig::from_env().context("loading configuration from environment")?,
    };
    let config = overrides.apply(loaded)?;
    tracing::info!(?config, "starting count-todos");

    let store = RestTaskStore::new(
        RestStoreConfig::new(config.store_url.clone(), config.service_key.clone())
            .with_timeout(config.request_timeout()),
    )?;
    let validator = RemoteTokenValidator::with_timeout(
        &config.store_url,
        config.service_key.clone(),
        config.request_timeout(),
    )?;
    let service = Arc::new(CountService::new(Arc::new(validator), Arc::new(store)));

    http::serve(&config, service).await?;
    Ok(())
}

async fn dev(tokens: Vec<String>, tasks: Vec<String>, overrides: Overrides) -> Result<()> {
    let mut validator = MockValidator::new();
    for pair in &tokens {
        let Some((token, user)) = pair.split_once('=') else {
            bail!("expected TOKEN=USER, got {pair:?}");
        };
        validator = validator.with_token(token, user);
    }

    let store = Arc::new(InMemoryTaskStore::new());
    for entry in &tasks {
        let Some((user, text)) = entry.split_once(':') else {
            bail!("expected USER:TEXT, got {entry:?}");
        };
        let (completed, text) = match text.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let task = store.insert(NewTask::new(user, text)?).await?;
        if completed {
            store.set_completed(&task.id, user, true).await?;
        }
    }

    let placeholder = Url::parse("http://localhost/").context("placeholder store url")?;
    let config = overrides.apply(ServiceConfig::new(placeholder, "dev"))?;
    tracing::info!(
        tokens = tokens.len(),
        tasks = store.len(),
        path = %config.function_path,
        "starting count-todos with in-memory store"
    );

    let service = Arc::new(CountService::new(Arc::new(validator), store));
    http::serve(&config, service).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ServiceConfig {
        ServiceConfig::new(Url::parse("https://db.example.co").unwrap(), "secret")
    }

    fn overrides(function_path: Option<&str>, timeout: Option<u64>) -> Overrides {
        Overrides {
            bind: None,
            function_path: function_path.map(str::to_string),
            timeout,
        }
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = overrides(Some("/count"), Some(3)).apply(base()).unwrap();
        assert_eq!(config.function_path, "/count");
        assert_eq!(config.request_timeout_secs, 3);
    }

    #[test]
    fn test_relative_function_path_is_rejected() {
        assert!(overrides(Some("count"), None).apply(base()).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(overrides(None, Some(0)).apply(base()).is_err());
    }

    #[test]
    fn test_cli_parses_dev_subcommand() {
        let cli = Cli::try_parse_from([
            "tasklist-server",
            "dev",
            "--token",
            "t=alice",
            "--function-path",
            "/count",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Dev { ref tokens, .. } if tokens == &["t=alice"]));
    }
}
