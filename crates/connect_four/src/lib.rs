//! Connect Four game logic.
//!
//! Pure, synchronous building blocks consumed by the session server:
//!
//! - **Board**: fixed-size grid with gravity-based disc placement
//! - **Rules**: "connect N" win detection and draw detection
//! - **Opponents**: automated column choosers for the second player
//!
//! # Example
//!
//! ```
//! use connect_four::{Board, Player, rules};
//!
//! let mut board = Board::new(7, 6);
//! for _ in 0..4 {
//!     board.drop_disc(3, Player::First).unwrap();
//! }
//! assert!(rules::check_win(&board, Player::First, 4));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod opponent;
pub mod rules;
mod types;

pub use board::{Board, BoardShapeError, PlaceError};
pub use opponent::{
    HeuristicOpponent, LeftmostOpponent, Opponent, OpponentError, OpponentStrategy,
};
pub use types::{Cell, Move, Player};
