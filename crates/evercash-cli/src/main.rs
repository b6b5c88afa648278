//! evercash - command-line client for Evercash budgets.
//!
//! Composes a session the way an application would (storage, identity
//! provider, credential manager, cache, session controller) and runs one
//! command against the active backend. Demo mode works offline.

mod commands;
mod output;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evercash_core::models::LocaleHint;
use evercash_core::{
    Config, CredentialManager, FileStore, GoTrueProvider, IdentityProvider, KeyValueStore,
    KeyringStore, NoIdentityProvider, ReqwestTransport, ResponseCache, SessionController,
    SessionOptions, SystemClock, TracingNotifier, Transport,
};

/// Log file name prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "evercash.log";

#[derive(Debug, Parser)]
#[command(name = "evercash", version, about = "Evercash budgets from the command line")]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the API base URL
    #[arg(long, global = true, env = "EVERCASH_API_BASE_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        email: Option<String>,
    },
    /// Sign out and forget the stored credential
    Logout,
    /// Show connection, authentication and demo-mode status
    Status,
    /// List accounts
    Accounts,
    /// List transactions, newest first
    Transactions {
        #[arg(long)]
        account: Option<String>,
        /// Show at most this many rows
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// List categories
    Categories,
    /// List payees
    Payees,
    /// Show the budget for a month (YYYY-MM, default current month)
    Budget {
        month: Option<String>,
    },
    /// List savings goals
    Goals,
    /// Generate a report (spending, income, ...)
    Report {
        kind: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Show remaining import credits
    Credits,
    /// Add a transaction (negative amounts are outflows)
    AddTransaction {
        #[arg(long)]
        account: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// YYYY-MM-DD, default today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        payee: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Import a bank statement file into an account
    Import {
        #[arg(long)]
        account: String,
        file: PathBuf,
    },
    /// Switch demo mode on or off, reset its data, or seed sample data
    /// into your real account (and clear it again)
    Demo {
        #[arg(value_enum)]
        action: DemoAction,
        /// Seed even when the account already has transactions
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoAction {
    On,
    Off,
    Reset,
    Seed,
    Clear,
}

/// Everything a command needs.
pub struct App {
    pub controller: SessionController,
    pub gotrue: Option<Arc<GoTrueProvider>>,
    pub storage: Arc<dyn KeyValueStore>,
    pub json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). When a log directory is
/// configured, a daily rolling file is written as well; keep the returned
/// guard alive until exit so buffered lines are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr = fmt::layer().with_writer(io::stderr);

    match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}

fn build_app(config: &Config, json: bool) -> Result<App> {
    let storage: Arc<dyn KeyValueStore> = if config.use_keyring {
        Arc::new(KeyringStore::new())
    } else {
        let dir = config.data_dir()?;
        Arc::new(FileStore::new(&dir))
    };
    let transport: Arc<dyn Transport> =
        Arc::new(ReqwestTransport::new().context("Failed to create HTTP client")?);
    let clock = Arc::new(SystemClock);

    let gotrue = match (&config.auth_url, &config.auth_anon_key) {
        (Some(url), Some(key)) => Some(Arc::new(GoTrueProvider::new(
            Arc::clone(&transport),
            Arc::clone(&storage),
            clock.clone(),
            url,
            key,
        ))),
        _ => {
            debug!("No identity provider configured");
            None
        }
    };
    let identity: Arc<dyn IdentityProvider> = match &gotrue {
        Some(provider) => Arc::clone(provider) as Arc<dyn IdentityProvider>,
        None => Arc::new(NoIdentityProvider),
    };

    let credentials = Arc::new(CredentialManager::new(identity, Arc::clone(&storage), clock));
    let controller = SessionController::new(
        SessionOptions {
            api_base_url: config.api_base_url.clone(),
            verify_on_init: config.verify_on_init,
            locale: LocaleHint::from_env(),
        },
        transport,
        credentials,
        Arc::clone(&storage),
        Arc::new(ResponseCache::new(config.cache_ttl())),
        Arc::new(TracingNotifier),
    );

    Ok(App {
        controller,
        gotrue,
        storage,
        json,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }

    let _guard = init_tracing(config.log_dir.as_deref());
    info!(api = %config.api_base_url, "evercash starting");

    let app = build_app(&config, cli.json)?;
    let result = commands::run(cli.command, &app).await;
    app.controller.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_takes_force() {
        let cli = Cli::try_parse_from(["evercash", "demo", "seed", "--force"]).unwrap();
        match cli.command {
            Command::Demo { action, force } => {
                assert_eq!(action, DemoAction::Seed);
                assert!(force);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_demo_clear_defaults_to_no_force() {
        let cli = Cli::try_parse_from(["evercash", "demo", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Demo {
                action: DemoAction::Clear,
                force: false
            }
        ));
        assert!(Cli::try_parse_from(["evercash", "demo", "sideways"]).is_err());
    }
}
