//! Draw detection logic for Connect Four.

use crate::Board;
use tracing::instrument;

/// Checks if the game is a draw.
///
/// A draw occurs when the board is full. Callers check for a win first, since
/// the move that fills the board may also complete a line.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    board.is_full()
}
