//! Automated opponents that choose a column for the second player.

use crate::rules::{DEFAULT_CONNECT, winning_move};
use crate::{Board, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Errors an opponent can report instead of a column.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum OpponentError {
    /// Every column is full.
    #[display("No legal move available")]
    NoLegalMove,

    /// The opponent failed for another reason.
    #[display("Opponent failed: {}", _0)]
    Failed(String),
}

impl std::error::Error for OpponentError {}

/// Chooses the automated player's column.
///
/// Implementations are pure: the same board always yields the same answer
/// and the board is never modified.
pub trait Opponent: Send + Sync {
    /// Picks a column for [`Player::Second`] on `board`.
    fn choose_column(&self, board: &Board) -> Result<usize, OpponentError>;

    /// Display name used in logs.
    fn name(&self) -> &str;
}

/// Which built-in opponent to run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OpponentStrategy {
    /// [`HeuristicOpponent`].
    #[default]
    Heuristic,
    /// [`LeftmostOpponent`].
    Leftmost,
}

impl OpponentStrategy {
    /// Builds the opponent for a game won by `connect` aligned discs.
    #[instrument]
    pub fn build(self, connect: usize) -> Box<dyn Opponent> {
        match self {
            OpponentStrategy::Heuristic => Box::new(HeuristicOpponent::new(connect)),
            OpponentStrategy::Leftmost => Box::new(LeftmostOpponent),
        }
    }
}

/// Wins when it can, blocks when it must, otherwise plays toward the center.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicOpponent {
    connect: usize,
}

impl HeuristicOpponent {
    /// Creates an opponent for a game won by `connect` aligned discs.
    pub fn new(connect: usize) -> Self {
        Self { connect }
    }

    /// Legal columns ordered center-first, ties broken toward the left.
    fn center_first(board: &Board) -> Vec<usize> {
        let width = board.width();
        let mut columns = board.legal_columns();
        columns.sort_by_key(|&column| ((2 * column).abs_diff(width.saturating_sub(1)), column));
        columns
    }
}

impl Default for HeuristicOpponent {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT)
    }
}

impl Opponent for HeuristicOpponent {
    #[instrument(skip(self, board), fields(connect = self.connect))]
    fn choose_column(&self, board: &Board) -> Result<usize, OpponentError> {
        if let Some(column) = winning_move(board, Player::Second, self.connect) {
            debug!(column, "Taking winning column");
            return Ok(column);
        }
        if let Some(column) = winning_move(board, Player::First, self.connect) {
            debug!(column, "Blocking opponent's winning column");
            return Ok(column);
        }

        Self::center_first(board)
            .first()
            .copied()
            .ok_or(OpponentError::NoLegalMove)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Always plays the lowest-numbered column with room left.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeftmostOpponent;

impl Opponent for LeftmostOpponent {
    #[instrument(skip(self, board))]
    fn choose_column(&self, board: &Board) -> Result<usize, OpponentError> {
        board
            .legal_columns()
            .first()
            .copied()
            .ok_or(OpponentError::NoLegalMove)
    }

    fn name(&self) -> &str {
        "leftmost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_heuristic_prefers_center() {
        let opponent = HeuristicOpponent::default();
        assert_eq!(opponent.choose_column(&Board::new(7, 6)), Ok(3));
        assert_eq!(opponent.choose_column(&Board::new(4, 4)), Ok(1));
    }

    #[test]
    fn test_heuristic_takes_win() {
        let mut board = Board::new(7, 6);
        for _ in 0..3 {
            board.drop_disc(6, Player::Second).unwrap();
            board.drop_disc(0, Player::First).unwrap();
        }
        // Both players threaten; winning beats blocking.
        assert_eq!(HeuristicOpponent::new(4).choose_column(&board), Ok(6));
    }

    #[test]
    fn test_heuristic_blocks() {
        let mut board = Board::new(7, 6);
        for column in 0..3 {
            board.drop_disc(column, Player::First).unwrap();
        }
        assert_eq!(HeuristicOpponent::new(4).choose_column(&board), Ok(3));
    }

    #[test]
    fn test_heuristic_skips_full_center() {
        let mut board = Board::new(3, 2);
        board.drop_disc(1, Player::First).unwrap();
        board.drop_disc(1, Player::Second).unwrap();
        assert_eq!(HeuristicOpponent::new(4).choose_column(&board), Ok(0));
    }

    #[test]
    fn test_leftmost() {
        let mut board = Board::new(2, 1);
        assert_eq!(LeftmostOpponent.choose_column(&board), Ok(0));
        board.drop_disc(0, Player::First).unwrap();
        assert_eq!(LeftmostOpponent.choose_column(&board), Ok(1));
        board.drop_disc(1, Player::First).unwrap();
        assert_eq!(
            LeftmostOpponent.choose_column(&board),
            Err(OpponentError::NoLegalMove)
        );
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = Board::new(1, 1);
        board.drop_disc(0, Player::First).unwrap();
        assert_eq!(
            HeuristicOpponent::default().choose_column(&board),
            Err(OpponentError::NoLegalMove)
        );
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            OpponentStrategy::from_str("leftmost"),
            Ok(OpponentStrategy::Leftmost)
        );
        assert_eq!(OpponentStrategy::Heuristic.to_string(), "heuristic");
        assert_eq!(OpponentStrategy::Leftmost.build(4).name(), "leftmost");
    }
}
