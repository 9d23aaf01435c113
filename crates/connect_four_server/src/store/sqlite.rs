//! SQLite session store backed by diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use super::models::{NewSessionRow, SessionRow};
use super::{SessionStore, StoreError, schema};
use crate::session::{GameSession, SessionId, SessionStatus};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds SQLite waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Stores sessions in a SQLite database file.
///
/// Every operation opens its own connection and runs on the blocking thread
/// pool. An in-memory path (`":memory:"`) does not work here, since each
/// connection would see a different database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path` and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        let store = Self { db_path };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migrations failed: {}", e)))?;
        info!(path = %store.db_path, migrations = applied.len(), "Session database ready");
        Ok(store)
    }

    /// Number of stored sessions with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub async fn count_by_status(&self, status: SessionStatus) -> Result<i64, StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = store.connection()?;
            let count = schema::game_sessions::table
                .filter(schema::game_sessions::status.eq(status.to_string()))
                .count()
                .get_result::<i64>(&mut conn)?;
            debug!(%status, count, "Counted sessions");
            Ok::<_, StoreError>(count)
        })
        .await?
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
            .execute(&mut conn)?;
        Ok(conn)
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn save(&self, session: &GameSession) -> Result<(), StoreError> {
        let row = NewSessionRow::from_session(session)?;
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = store.connection()?;
            diesel::replace_into(schema::game_sessions::table)
                .values(&row)
                .execute(&mut conn)?;
            Ok::<_, StoreError>(())
        })
        .await??;
        debug!(status = %session.status(), "Session saved");
        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<GameSession>, StoreError> {
        let key = id.to_string();
        let store = self.clone();
        let row = tokio::task::spawn_blocking(move || {
            let mut conn = store.connection()?;
            let row = schema::game_sessions::table
                .filter(schema::game_sessions::id.eq(key))
                .select(SessionRow::as_select())
                .first::<SessionRow>(&mut conn)
                .optional()?;
            Ok::<_, StoreError>(row)
        })
        .await??;

        match row {
            Some(row) => Ok(Some(row.into_session()?)),
            None => {
                debug!("Session not found");
                Ok(None)
            }
        }
    }
}
