//! Core domain types for Connect Four.

use serde::{Deserialize, Serialize};

/// Player in the game.
///
/// `First` is always the human caller, `Second` the automated opponent.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Player {
    /// Human player (always moves first).
    First,
    /// Automated opponent.
    Second,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Single-character symbol used when rendering boards.
    pub fn symbol(self) -> char {
        match self {
            Player::First => 'X',
            Player::Second => 'O',
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Cell holding a player's disc.
    Occupied(Player),
}

/// Where a single disc landed.
///
/// Row 0 is the bottom of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    column: usize,
    row: usize,
}

impl Move {
    /// Creates a move at the given coordinate.
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Column the disc was dropped into.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Row the disc came to rest on.
    pub fn row(&self) -> usize {
        self.row
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "column {} row {}", self.column, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Player::First.opponent(), Player::Second);
        assert_eq!(Player::Second.opponent(), Player::First);
    }

    #[test]
    fn test_player_serializes_snake_case() {
        let json = serde_json::to_string(&Player::Second).unwrap();
        assert_eq!(json, "\"second\"");
        assert_eq!(Player::First.to_string(), "first");
    }
}
