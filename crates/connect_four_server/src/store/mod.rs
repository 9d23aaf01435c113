//! Session persistence.
//!
//! The turn engine only needs two operations from a store: save a session and
//! find one by id. Two backends are provided:
//!
//! - [`MemoryStore`]: process-local map, the default
//! - [`SqliteStore`]: durable SQLite file via diesel

mod error;
mod memory;
mod models;
mod schema; // Diesel table definitions - internal use only
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::session::{GameSession, SessionId};
use async_trait::async_trait;

/// Durable lookup of session records by id.
///
/// Implementations must give read-your-writes consistency for a single id:
/// a `find_by_id` issued after `save` returns observes that save.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces the record for `session.id()`.
    async fn save(&self, session: &GameSession) -> Result<(), StoreError>;

    /// Loads the record for `id`, or `None` if it was never saved.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<GameSession>, StoreError>;
}
