//! shaya server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! the process environment, opens the SQLite store, and serves the API over
//! HTTP.
//!
//! # First administrator
//!
//! Every create route requires an admin session, so bootstrap one with:
//!
//! ```text
//! cargo run -p shaya-server --bin shaya -- create-admin \
//!   --username admin --full-name "Ana Rios" --document 1234 --email ana@example.com
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use shaya_core::{
  password::hash_password,
  person::PersonInput,
  service::EntityService,
  user::{NewUser, Role, User},
};
use shaya_server::{AppState, ServerConfig};
use shaya_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Shaya administrative backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,

  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,

  /// Create an admin user; the password is read from stdin.
  CreateAdmin {
    #[arg(long)]
    username:  String,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    document:  String,
    #[arg(long)]
    email:     String,
    #[arg(long)]
    phone:     Option<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if let Some(Command::HashPassword) = cli.command {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let server_cfg = load_config(&cli.config)?;
  for name in server_cfg.ignored_db_settings() {
    tracing::warn!("{name} is set but the SQLite backend ignores it");
  }

  let store = SqliteStore::open(&server_cfg.db_name)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.db_name))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::CreateAdmin { username, full_name, document, email, phone } => {
      let password = read_password()?;
      let admin = EntityService::<_, User>::new(&store)
        .create(NewUser {
          username,
          password,
          role: Role::Admin,
          person: PersonInput { full_name, document, phone, email, observation: None },
        })
        .await
        .context("failed to create admin")?;
      println!("created admin {} (id {})", admin.username, admin.id);
      Ok(())
    }
    Command::Serve | Command::HashPassword => serve(store, server_cfg).await,
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = shaya_server::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Layer the optional TOML file under environment variables. Keys are the
/// lowercased variable names, so `DB_NAME` sets `db_name`.
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::default())
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  anyhow::ensure!(!server_cfg.secret_key.is_empty(), "SECRET_KEY must not be empty");
  Ok(server_cfg)
}

/// Read one password line from stdin.
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
