//! Connect Four session server.
//!
//! A remote caller plays Connect Four against an automated opponent. Each
//! request plays one full turn: the caller's disc, then the opponent's reply.
//!
//! # Architecture
//!
//! - **Engine**: creates sessions and serializes turns with one lock per
//!   session
//! - **Store**: persists sessions between turns (in memory or SQLite)
//! - **HTTP**: REST routes over the engine
//! - **Config**: TOML configuration for board size, opponent and policies
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use connect_four::HeuristicOpponent;
//! use connect_four_server::{EngineSettings, MemoryStore, SessionStatus, TurnEngine};
//!
//! # async fn example() -> Result<(), connect_four_server::EngineError> {
//! let engine = TurnEngine::new(
//!     EngineSettings::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(HeuristicOpponent::default()),
//! );
//! let session = engine.create_session().await?;
//! let session = engine.perform_move(*session.id(), 3).await?;
//! assert_eq!(*session.status(), SessionStatus::InProgress);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
pub mod http;
mod registry;
mod session;
mod store;

pub use config::{BoardConfig, ConfigError, ServerConfig, SessionPolicy, StorageConfig};
pub use engine::{EngineSettings, TurnEngine};
pub use error::{EngineError, ErrorKind};
pub use registry::{LockRegistry, SessionLock};
pub use session::{GameSession, SessionId, SessionStatus};
pub use store::{MemoryStore, SessionStore, SqliteStore, StoreError};
