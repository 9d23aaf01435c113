//! In-memory session store.

use super::{SessionStore, StoreError};
use crate::session::{GameSession, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

/// Keeps every session in a shared map for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Checks if no session has been saved.
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, GameSession>> {
        // A panic while holding the guard cannot leave a half-written entry.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn save(&self, session: &GameSession) -> Result<(), StoreError> {
        self.sessions().insert(*session.id(), session.clone());
        debug!(status = %session.status(), "Session saved");
        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<GameSession>, StoreError> {
        let session = self.sessions().get(id).cloned();
        if session.is_none() {
            debug!("Session not found");
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_four::{Board, Player};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_save_then_find() {
        let store = MemoryStore::new();
        let mut session = GameSession::new(Uuid::new_v4(), Board::new(7, 6));
        store.save(&session).await.unwrap();

        session.play(4, Player::First).unwrap();
        store.save(&session).await.unwrap();

        let found = store.find_by_id(session.id()).await.unwrap();
        assert_eq!(found, Some(session));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.find_by_id(&Uuid::new_v4()).await.unwrap(), None);
    }
}
