//! Win detection logic for Connect Four.

use crate::{Board, Cell, Player};
use tracing::instrument;

/// Number of aligned discs needed to win a classic game.
pub const DEFAULT_CONNECT: usize = 4;

/// Line directions as (column step, row step): horizontal, vertical and both
/// diagonals. Opposite directions are covered by scanning from every cell.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Checks if `player` has `connect` discs in an unbroken line.
///
/// Lines run horizontally, vertically or diagonally. A `connect` of zero
/// never wins.
#[instrument(skip(board), fields(width = board.width(), height = board.height()))]
pub fn check_win(board: &Board, player: Player, connect: usize) -> bool {
    if connect == 0 {
        return false;
    }

    for row in 0..board.height() {
        for column in 0..board.width() {
            if board.get(column, row) != Some(Cell::Occupied(player)) {
                continue;
            }
            for (dc, dr) in DIRECTIONS {
                if run_length(board, player, column, row, dc, dr, connect) >= connect {
                    return true;
                }
            }
        }
    }

    false
}

/// Returns the lowest column where dropping a disc for `player` wins at once.
#[instrument(skip(board))]
pub fn winning_move(board: &Board, player: Player, connect: usize) -> Option<usize> {
    board.legal_columns().into_iter().find(|&column| {
        let mut trial = board.clone();
        trial.drop_disc(column, player).is_ok() && check_win(&trial, player, connect)
    })
}

/// Counts consecutive `player` discs starting at `(column, row)`, stopping at
/// `limit`.
fn run_length(
    board: &Board,
    player: Player,
    column: usize,
    row: usize,
    dc: isize,
    dr: isize,
    limit: usize,
) -> usize {
    let mut count = 0;
    let (mut c, mut r) = (column as isize, row as isize);
    while count < limit && c >= 0 && r >= 0 {
        match board.get(c as usize, r as usize) {
            Some(Cell::Occupied(p)) if p == player => count += 1,
            _ => break,
        }
        c += dc;
        r += dr;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(width: usize, height: usize, moves: &[(usize, Player)]) -> Board {
        let mut board = Board::new(width, height);
        for &(column, player) in moves {
            board.drop_disc(column, player).unwrap();
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new(7, 6);
        assert!(!check_win(&board, Player::First, DEFAULT_CONNECT));
        assert!(!check_win(&board, Player::Second, DEFAULT_CONNECT));
    }

    #[test]
    fn test_vertical_win() {
        let board = board_with(7, 6, &[(3, Player::First); 4]);
        assert!(check_win(&board, Player::First, 4));
        assert!(!check_win(&board, Player::Second, 4));
    }

    #[test]
    fn test_horizontal_win() {
        let moves: Vec<_> = (2..6).map(|c| (c, Player::Second)).collect();
        let board = board_with(7, 6, &moves);
        assert!(check_win(&board, Player::Second, 4));
    }

    #[test]
    fn test_diagonal_up_win() {
        use Player::{First as X, Second as O};
        let board = board_with(
            7,
            6,
            &[
                (0, X),
                (1, O),
                (1, X),
                (2, O),
                (2, O),
                (2, X),
                (3, O),
                (3, O),
                (3, O),
                (3, X),
            ],
        );
        assert!(check_win(&board, X, 4));
        assert!(!check_win(&board, O, 4));
    }

    #[test]
    fn test_diagonal_down_win() {
        use Player::{First as X, Second as O};
        let board = board_with(
            7,
            6,
            &[
                (6, X),
                (5, O),
                (5, X),
                (4, O),
                (4, O),
                (4, X),
                (3, O),
                (3, O),
                (3, O),
                (3, X),
            ],
        );
        assert!(check_win(&board, X, 4));
    }

    #[test]
    fn test_three_is_not_enough() {
        let board = board_with(7, 6, &[(0, Player::First), (1, Player::First), (2, Player::First)]);
        assert!(!check_win(&board, Player::First, 4));
        assert!(check_win(&board, Player::First, 3));
    }

    #[test]
    fn test_connect_longer_than_board_never_wins() {
        let board = board_with(3, 3, &[(0, Player::First), (1, Player::First), (2, Player::First)]);
        assert!(!check_win(&board, Player::First, 4));
    }

    #[test]
    fn test_winning_move() {
        let board = board_with(7, 6, &[(0, Player::Second), (1, Player::Second), (2, Player::Second)]);
        assert_eq!(winning_move(&board, Player::Second, 4), Some(3));
        assert_eq!(winning_move(&board, Player::First, 4), None);
    }
}
