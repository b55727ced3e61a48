//! nsos-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `NSOS_*` environment variables, opens the SQLite store, and serves the
//! records API over HTTP.
//!
//! # Provisioning
//!
//! ```text
//! nsos-server --create-admin alice     # reads the password from stdin
//! nsos-server --hash-password          # prints an argon2 PHC string
//! ```

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use nsos_core::store::RecordStore;
use nsos_server::{AppState, ServerConfig, auth::hash_password};
use nsos_store_sqlite::{SqliteStore, StoreOptions};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "NSOS records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create an admin account with a password entered on stdin and exit.
  #[arg(long, value_name = "USERNAME", conflicts_with = "hash_password")]
  create_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  server_cfg.database_path = expand_tilde(&server_cfg.database_path);
  server_cfg.uploads_dir = expand_tilde(&server_cfg.uploads_dir);

  let options = StoreOptions {
    timeout:    Duration::from_millis(server_cfg.store_timeout_ms),
    audit_mode: server_cfg.audit_mode,
  };
  let store = SqliteStore::open(&server_cfg.database_path, options)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.database_path))?;

  if let Some(username) = cli.create_admin {
    let password = read_password()?;
    let id = store
      .create_admin(username.clone(), hash_password(&password)?)
      .await
      .with_context(|| format!("failed to create admin {username:?}"))?;
    tracing::info!(admin_id = id, %username, "admin created");
    return Ok(());
  }

  let state = AppState::new(store, server_cfg.clone());
  state
    .uploads
    .ensure()
    .await
    .with_context(|| format!("failed to create uploads dir {:?}", server_cfg.uploads_dir))?;

  let app = nsos_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(audit_mode = ?server_cfg.audit_mode, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Read a non-empty password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\r', '\n']).to_owned();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
