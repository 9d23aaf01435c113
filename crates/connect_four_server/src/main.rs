//! Connect Four session server - unified CLI.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use connect_four::Opponent;
use connect_four_server::{
    EngineError, MemoryStore, ServerConfig, SessionStatus, SessionStore, SqliteStore, TurnEngine,
    http,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let engine = Arc::new(build_engine(&config)?);

    match cli.command {
        Command::Http { port, host } => run_http_server(engine, &config, host, port).await,
        Command::Play => run_terminal_game(engine).await,
    }
}

/// Wires the configured store and opponent into a turn engine.
#[instrument(skip(config))]
fn build_engine(config: &ServerConfig) -> Result<TurnEngine> {
    let store: Arc<dyn SessionStore> = match config.storage().database_path() {
        Some(path) => Arc::new(
            SqliteStore::open(path.clone())
                .with_context(|| format!("opening session database '{}'", path))?,
        ),
        None => {
            info!("No database configured, keeping sessions in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let opponent: Arc<dyn Opponent> = Arc::from(config.opponent().build(*config.board().connect()));

    Ok(TurnEngine::new(config.engine_settings(), store, opponent))
}

/// Run the HTTP game server
async fn run_http_server(
    engine: Arc<TurnEngine>,
    config: &ServerConfig,
    host: String,
    port: u16,
) -> Result<()> {
    if let Some(ttl) = config.sessions().idle_ttl() {
        let interval = config.sessions().reap_interval();
        info!(ttl_secs = ttl.as_secs(), interval_secs = interval.as_secs(), "Idle session reaper enabled");
        tokio::spawn(reap_idle_sessions(Arc::clone(&engine), ttl, interval));
    }

    let app = http::router(engine);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Server ready at http://{}:{}/", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Periodically evicts lock entries of abandoned sessions.
async fn reap_idle_sessions(
    engine: Arc<TurnEngine>,
    ttl: std::time::Duration,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let evicted = engine.reap_idle(ttl);
        debug!(evicted = evicted.len(), active = engine.active_sessions(), "Reaper pass finished");
    }
}

/// Run a local game, reading columns from stdin
async fn run_terminal_game(engine: Arc<TurnEngine>) -> Result<()> {
    let mut session = engine.create_session().await?;
    let id = *session.id();
    println!("{}\n", session.board().display());
    println!("You are X. Enter a column (0-{}), or an empty line to quit.", session.board().width() - 1);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            break;
        }
        let Ok(column) = input.parse::<i64>() else {
            println!("'{}' is not a column number.", input);
            continue;
        };

        session = match engine.perform_move(id, column).await {
            Ok(session) => session,
            Err(e @ (EngineError::ColumnOutOfRange { .. } | EngineError::ColumnFull(_))) => {
                println!("{}. Try again.", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        println!("\n{}\n", session.board().display());
        match session.status() {
            SessionStatus::InProgress => println!("Your move."),
            SessionStatus::FirstPlayerWon => {
                println!("You win!");
                break;
            }
            SessionStatus::SecondPlayerWon => {
                println!("The computer wins.");
                break;
            }
            SessionStatus::Draw => {
                println!("It's a draw.");
                break;
            }
        }
    }

    Ok(())
}
