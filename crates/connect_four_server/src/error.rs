//! Turn engine error types.

use crate::session::SessionId;
use crate::store::StoreError;
use serde::Serialize;

/// Broad category of an [`EngineError`], as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request itself is malformed; retrying it unchanged will fail again.
    InvalidArgument,
    /// The session does not exist or no longer accepts moves.
    SessionNotFound,
    /// The session stayed locked by another turn for too long.
    Busy,
    /// A collaborator (opponent or store) failed.
    Internal,
}

/// Error that can occur when creating, playing or reading a session.
#[derive(Debug, Clone, derive_more::Display)]
pub enum EngineError {
    /// The requested column is not on the board.
    #[display("Column {} is outside the board (width {})", column, width)]
    ColumnOutOfRange {
        /// Requested column.
        column: i64,
        /// Board width.
        width: usize,
    },

    /// The requested column has no free row.
    #[display("Column {} is full", _0)]
    ColumnFull(usize),

    /// No playable session with this id exists.
    #[display("Game session {} does not exist", _0)]
    SessionNotFound(SessionId),

    /// Waiting for the session lock timed out.
    #[display("Game session {} is busy", _0)]
    LockTimeout(SessionId),

    /// The automated opponent could not produce a playable column.
    #[display("Automated opponent failed: {}", _0)]
    Opponent(String),

    /// The session store failed.
    #[display("{}", _0)]
    Store(StoreError),

    /// The task running a turn panicked or was cancelled before finishing.
    #[display("Turn on game session {} aborted: {}", _0, _1)]
    TurnAborted(SessionId, String),
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err)
    }
}

impl EngineError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ColumnOutOfRange { .. } | EngineError::ColumnFull(_) => {
                ErrorKind::InvalidArgument
            }
            EngineError::SessionNotFound(_) => ErrorKind::SessionNotFound,
            EngineError::LockTimeout(_) => ErrorKind::Busy,
            EngineError::Opponent(_) | EngineError::Store(_) | EngineError::TurnAborted(..) => {
                ErrorKind::Internal
            }
        }
    }
}
