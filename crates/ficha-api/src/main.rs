//! ficha-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured storage realization, and serves the intake API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the sha-256 hex digest stored in the user table:
//!
//! ```
//! cargo run -p ficha-api --bin server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use sha2::{Digest as _, Sha256};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use ficha_api::{AppState, BackendKind, MailConfig, ServerConfig};
use ficha_core::table::TableBackend as _;
use ficha_service::{AnyBackend, mail::MailRelay};
use ficha_store_sheet::SheetBackend;
use ficha_store_sqlite::DocStore;

#[derive(Parser)]
#[command(author, version, about = "Ficha intake server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the sha-256 hex digest for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hex::encode(Sha256::digest(password.as_bytes())));
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FICHA").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // The document store is always opened — drafts live there even when
  // cases go to the sheet realization.
  let sqlite_path = expand_tilde(&server_cfg.sqlite_path);
  let doc_store = DocStore::open(&sqlite_path)
    .await
    .with_context(|| format!("failed to open store at {sqlite_path:?}"))?;

  let backend = match server_cfg.backend {
    BackendKind::Sqlite => AnyBackend::Doc(doc_store.clone()),
    BackendKind::Sheet => {
      let sheet_path = server_cfg
        .sheet_path
        .as_deref()
        .context("backend = \"sheet\" requires sheet_path")?;
      let sheet_path = expand_tilde(sheet_path);
      let sheet = SheetBackend::open(&sheet_path)
        .await
        .with_context(|| format!("failed to open workbook at {sheet_path:?}"))?;
      AnyBackend::Sheet(sheet)
    }
  };

  let mail = match &server_cfg.mail {
    MailConfig::Smtp { host, port, username, password, from } => {
      MailRelay::smtp(host, *port, username, password, from)
        .map_err(|e| anyhow::anyhow!("mail relay: {e}"))?
    }
    MailConfig::File { dir, from } => MailRelay::file(dir, from)
      .map_err(|e| anyhow::anyhow!("mail relay: {e}"))?,
  };

  let state = AppState::new(backend, doc_store, mail)
    .await
    .context("failed to open the user table")?;
  tracing::info!("storage backend: {}", state.backend.identifier());

  let app = ficha_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
