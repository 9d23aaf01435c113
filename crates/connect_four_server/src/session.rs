//! Game session record.

use connect_four::{Board, Move, Player};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Unique identifier for a game session.
pub type SessionId = Uuid;

/// Lifecycle status of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Moves are accepted.
    InProgress,
    /// The human player connected a line.
    FirstPlayerWon,
    /// The automated opponent connected a line.
    SecondPlayerWon,
    /// The board filled up without a winner.
    Draw,
}

impl SessionStatus {
    /// Checks if no further turns are accepted.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    /// Status for a game won by `player`.
    pub fn won_by(player: Player) -> Self {
        match player {
            Player::First => SessionStatus::FirstPlayerWon,
            Player::Second => SessionStatus::SecondPlayerWon,
        }
    }
}

/// One game between the human caller and the automated opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GameSession {
    /// Session ID.
    id: SessionId,
    /// The board.
    board: Board,
    /// Game status.
    status: SessionStatus,
    /// Where the human player's most recent disc landed.
    first_player_last_move: Option<Move>,
    /// Where the opponent's most recent disc landed.
    second_player_last_move: Option<Move>,
}

impl GameSession {
    /// Creates an in-progress session with no moves recorded.
    #[instrument(skip(board), fields(width = board.width(), height = board.height()))]
    pub fn new(id: SessionId, board: Board) -> Self {
        Self {
            id,
            board,
            status: SessionStatus::InProgress,
            first_player_last_move: None,
            second_player_last_move: None,
        }
    }

    /// Most recent move of `player`, if any.
    pub fn last_move(&self, player: Player) -> Option<Move> {
        match player {
            Player::First => self.first_player_last_move,
            Player::Second => self.second_player_last_move,
        }
    }

    /// Drops a disc for `player` and records it as their last move.
    pub(crate) fn play(
        &mut self,
        column: usize,
        player: Player,
    ) -> Result<Move, connect_four::PlaceError> {
        let placed = self.board.drop_disc(column, player)?;
        match player {
            Player::First => self.first_player_last_move = Some(placed),
            Player::Second => self.second_player_last_move = Some(placed),
        }
        Ok(placed)
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_session_is_in_progress() {
        let session = GameSession::new(Uuid::new_v4(), Board::new(7, 6));
        assert_eq!(*session.status(), SessionStatus::InProgress);
        assert_eq!(session.last_move(Player::First), None);
        assert_eq!(session.last_move(Player::Second), None);
    }

    #[test]
    fn test_play_records_last_move() {
        let mut session = GameSession::new(Uuid::new_v4(), Board::new(7, 6));
        session.play(2, Player::First).unwrap();
        session.play(2, Player::Second).unwrap();
        assert_eq!(session.last_move(Player::First), Some(Move::new(2, 0)));
        assert_eq!(*session.second_player_last_move(), Some(Move::new(2, 1)));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SessionStatus::FirstPlayerWon.to_string(), "FIRST_PLAYER_WON");
        assert_eq!(SessionStatus::from_str("DRAW"), Ok(SessionStatus::Draw));
        assert_eq!(
            serde_json::to_string(&SessionStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert!(SessionStatus::Draw.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
    }
}
