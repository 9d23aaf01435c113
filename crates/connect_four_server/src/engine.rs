//! Session creation and the serialized turn protocol.
//!
//! Every turn on a session runs under that session's lock: the human move is
//! applied, persisted and checked before the automated opponent is asked for
//! its reply. Turns on different sessions never share a lock.

use crate::error::EngineError;
use crate::registry::{LockRegistry, SessionLock};
use crate::session::{GameSession, SessionId, SessionStatus};
use crate::store::SessionStore;
use connect_four::{Board, Opponent, PlaceError, Player, rules};
use derive_getters::Getters;
use derive_setters::Setters;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{Instrument, debug, error, info, instrument, warn};
use uuid::Uuid;

/// Process-wide game settings applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct EngineSettings {
    /// Board columns.
    width: usize,
    /// Board rows.
    height: usize,
    /// Aligned discs needed to win.
    connect: usize,
    /// Longest wait for a busy session; `None` waits forever.
    #[setters(strip_option)]
    lock_timeout: Option<Duration>,
}

impl EngineSettings {
    /// Settings for a `width` × `height` board won by `connect` aligned discs,
    /// with unbounded lock waits.
    pub fn new(width: usize, height: usize, connect: usize) -> Self {
        Self {
            width,
            height,
            connect,
            lock_timeout: None,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(7, 6, rules::DEFAULT_CONNECT)
    }
}

/// Creates sessions and executes turns, one at a time per session.
pub struct TurnEngine {
    settings: EngineSettings,
    store: Arc<dyn SessionStore>,
    opponent: Arc<dyn Opponent>,
    locks: Arc<LockRegistry>,
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("settings", &self.settings)
            .field("opponent", &self.opponent.name())
            .field("locks", &self.locks.len())
            .finish()
    }
}

impl TurnEngine {
    /// Creates an engine with an empty lock registry.
    #[instrument(skip(store, opponent), fields(opponent_name = opponent.name()))]
    pub fn new(
        settings: EngineSettings,
        store: Arc<dyn SessionStore>,
        opponent: Arc<dyn Opponent>,
    ) -> Self {
        info!("Creating turn engine");
        Self {
            settings,
            store,
            opponent,
            locks: Arc::new(LockRegistry::new()),
        }
    }

    /// The settings every session is created with.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Starts a new game on an empty board.
    ///
    /// The session is persisted before its lock is registered, so a move can
    /// never find a lock without a stored record behind it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the session cannot be saved.
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> Result<GameSession, EngineError> {
        let id = Uuid::new_v4();
        let board = Board::new(self.settings.width, self.settings.height);
        let session = GameSession::new(id, board);

        self.store.save(&session).await?;
        self.locks.register(id);

        info!(session_id = %id, width = self.settings.width, height = self.settings.height, "Created new session");
        Ok(session)
    }

    /// Plays the human's disc in `column`, then the opponent's reply.
    ///
    /// Blocks while another turn on the same session is in progress. Once the
    /// lock is taken the turn runs on its own task, so it completes even if
    /// the caller stops waiting. The session lock is released on every exit
    /// path.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ColumnOutOfRange`] if `column` is not on the board
    ///   (checked before anything else)
    /// - [`EngineError::ColumnFull`] if `column` has no free row
    /// - [`EngineError::SessionNotFound`] if the session is unknown or over
    /// - [`EngineError::LockTimeout`] if the configured wait ran out
    /// - [`EngineError::Opponent`] or [`EngineError::Store`] if a
    ///   collaborator failed
    /// - [`EngineError::TurnAborted`] if the turn task panicked
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn perform_move(&self, id: SessionId, column: i64) -> Result<GameSession, EngineError> {
        let column = self.validate_column(column)?;

        let lock = self.locks.get(&id).ok_or_else(|| {
            debug!("No lock registered for session");
            EngineError::SessionNotFound(id)
        })?;

        let guard = self.acquire(id, lock).await?;
        let turn = Turn {
            id,
            column,
            connect: self.settings.connect,
            store: Arc::clone(&self.store),
            opponent: Arc::clone(&self.opponent),
            locks: Arc::clone(&self.locks),
        };

        let handle = tokio::spawn(
            async move {
                let _guard = guard;
                turn.run().await
            }
            .in_current_span(),
        );

        handle.await.map_err(|e| {
            error!(session_id = %id, error = %e, "Turn task aborted");
            EngineError::TurnAborted(id, e.to_string())
        })?
    }

    /// Loads the current state of a session without taking its lock.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionNotFound`] if no record exists.
    #[instrument(skip(self), fields(session_id = %id))]
    pub async fn get_session(&self, id: SessionId) -> Result<GameSession, EngineError> {
        self.store
            .find_by_id(&id)
            .await?
            .ok_or(EngineError::SessionNotFound(id))
    }

    /// Checks if moves on `id` are still accepted by the lock registry.
    pub fn is_registered(&self, id: &SessionId) -> bool {
        self.locks.contains(id)
    }

    /// Number of sessions still holding a lock entry.
    pub fn active_sessions(&self) -> usize {
        self.locks.len()
    }

    /// Drops lock entries of sessions untouched for `max_idle`.
    ///
    /// Evicted sessions stay readable but reject further moves as not found.
    #[instrument(skip(self))]
    pub fn reap_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        self.locks.evict_idle(max_idle)
    }

    fn validate_column(&self, column: i64) -> Result<usize, EngineError> {
        let width = self.settings.width;
        match usize::try_from(column) {
            Ok(c) if c < width => Ok(c),
            _ => {
                debug!(column, width, "Column out of range");
                Err(EngineError::ColumnOutOfRange { column, width })
            }
        }
    }

    async fn acquire(
        &self,
        id: SessionId,
        lock: SessionLock,
    ) -> Result<OwnedMutexGuard<()>, EngineError> {
        match self.settings.lock_timeout {
            None => Ok(lock.lock_owned().await),
            Some(limit) => tokio::time::timeout(limit, lock.lock_owned())
                .await
                .map_err(|_| {
                    warn!(session_id = %id, timeout_ms = limit.as_millis() as u64, "Timed out waiting for session lock");
                    EngineError::LockTimeout(id)
                }),
        }
    }
}

/// One turn on one session. Owns its collaborators so it can run detached
/// from the caller. Only run while holding the session's lock.
struct Turn {
    id: SessionId,
    column: usize,
    connect: usize,
    store: Arc<dyn SessionStore>,
    opponent: Arc<dyn Opponent>,
    locks: Arc<LockRegistry>,
}

impl Turn {
    async fn run(self) -> Result<GameSession, EngineError> {
        let id = self.id;
        let mut session = match self.store.find_by_id(&id).await? {
            Some(session) => session,
            None => {
                error!(session_id = %id, "Consistency fault: lock registered for a session missing from the store");
                return Err(EngineError::SessionNotFound(id));
            }
        };

        if session.status().is_terminal() {
            debug!(status = %session.status(), "Session already finished");
            return Err(EngineError::SessionNotFound(id));
        }

        // An earlier turn may have failed to persist its terminal status.
        if self.settle_decided(&mut session).await? {
            return Err(EngineError::SessionNotFound(id));
        }

        let human = session.play(self.column, Player::First).map_err(|e| match e {
            PlaceError::ColumnFull(c) => EngineError::ColumnFull(c),
            PlaceError::ColumnOutOfRange { width, .. } => EngineError::ColumnOutOfRange {
                column: self.column as i64,
                width,
            },
        })?;
        self.store.save(&session).await?;
        debug!(column = human.column(), row = human.row(), "Human move applied");

        if self.finish_if_over(&mut session, Player::First).await? {
            return Ok(session);
        }

        let reply = self.opponent.choose_column(session.board()).map_err(|e| {
            error!(error = %e, opponent = self.opponent.name(), "Opponent could not choose a column");
            EngineError::Opponent(e.to_string())
        })?;
        let machine = session.play(reply, Player::Second).map_err(|e| {
            error!(column = reply, error = %e, opponent = self.opponent.name(), "Opponent chose an unplayable column");
            EngineError::Opponent(format!("chose column {}: {}", reply, e))
        })?;
        self.store.save(&session).await?;
        debug!(column = machine.column(), row = machine.row(), "Opponent move applied");

        self.finish_if_over(&mut session, Player::Second).await?;
        Ok(session)
    }

    /// Applies a terminal status after `mover`'s disc, if the game is over.
    ///
    /// The status is persisted before the lock entry is removed. If the save
    /// fails the stored session stays in progress with its lock registered,
    /// and the next turn settles it.
    async fn finish_if_over(
        &self,
        session: &mut GameSession,
        mover: Player,
    ) -> Result<bool, EngineError> {
        let board = session.board();
        let status = if rules::check_win(board, mover, self.connect) {
            SessionStatus::won_by(mover)
        } else if rules::is_draw(board) {
            SessionStatus::Draw
        } else {
            return Ok(false);
        };

        self.finish(session, status).await?;
        Ok(true)
    }

    /// Finishes an in-progress session whose board is already decided.
    async fn settle_decided(&self, session: &mut GameSession) -> Result<bool, EngineError> {
        let board = session.board();
        let status = if rules::check_win(board, Player::First, self.connect) {
            SessionStatus::FirstPlayerWon
        } else if rules::check_win(board, Player::Second, self.connect) {
            SessionStatus::SecondPlayerWon
        } else if rules::is_draw(board) {
            SessionStatus::Draw
        } else {
            return Ok(false);
        };

        warn!(session_id = %session.id(), %status, "Settling decided game stored as in progress");
        self.finish(session, status).await?;
        Ok(true)
    }

    async fn finish(&self, session: &mut GameSession, status: SessionStatus) -> Result<(), EngineError> {
        session.set_status(status);
        self.store.save(session).await?;
        self.locks.remove(session.id());

        info!(session_id = %session.id(), %status, discs = session.board().disc_count(), "Game finished");
        Ok(())
    }
}
