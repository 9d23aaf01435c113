//! Fixed-size Connect Four grid.

use crate::types::{Cell, Move, Player};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Errors that can occur when dropping a disc.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PlaceError {
    /// The column index is not on the board.
    #[display("Column {} is outside the board (width {})", column, width)]
    ColumnOutOfRange {
        /// Requested column.
        column: usize,
        /// Board width.
        width: usize,
    },

    /// Every row of the column is occupied.
    #[display("Column {} is full", _0)]
    ColumnFull(usize),
}

impl std::error::Error for PlaceError {}

/// Stored board whose cell count does not match its dimensions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Board {}x{} needs {} cells, found {}", width, height, width.saturating_mul(*height), cells)]
pub struct BoardShapeError {
    /// Declared columns.
    pub width: usize,
    /// Declared rows.
    pub height: usize,
    /// Cells actually present.
    pub cells: usize,
}

impl std::error::Error for BoardShapeError {}

#[derive(Deserialize)]
struct RawBoard {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardShapeError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        match raw.width.checked_mul(raw.height) {
            Some(expected) if expected == raw.cells.len() => Ok(Self {
                width: raw.width,
                height: raw.height,
                cells: raw.cells,
            }),
            _ => Err(BoardShapeError {
                width: raw.width,
                height: raw.height,
                cells: raw.cells.len(),
            }),
        }
    }
}

/// Connect Four board of `width` columns and `height` rows.
///
/// Cells are stored row-major with row 0 at the bottom. Dimensions are fixed
/// at construction. Deserializing checks the cell count against the
/// dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board.
    #[instrument]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets the cell at `(column, row)`, or `None` when off the board.
    pub fn get(&self, column: usize, row: usize) -> Option<Cell> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + column).copied()
    }

    /// Number of discs currently stacked in `column`.
    pub fn column_height(&self, column: usize) -> usize {
        (0..self.height)
            .take_while(|&row| matches!(self.get(column, row), Some(Cell::Occupied(_))))
            .count()
    }

    /// Checks if a column cannot take another disc.
    ///
    /// Columns off the board count as full.
    pub fn is_column_full(&self, column: usize) -> bool {
        column >= self.width || self.column_height(column) >= self.height
    }

    /// Columns that can still take a disc, in ascending order.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..self.width)
            .filter(|&column| !self.is_column_full(column))
            .collect()
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// Number of discs on the board.
    pub fn disc_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != Cell::Empty).count()
    }

    /// Drops a disc for `player` into `column`.
    ///
    /// The disc lands on the lowest empty row. The board is left untouched
    /// when the move is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::ColumnOutOfRange`] for a column off the board and
    /// [`PlaceError::ColumnFull`] when the column has no free row.
    #[instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn drop_disc(&mut self, column: usize, player: Player) -> Result<Move, PlaceError> {
        if column >= self.width {
            return Err(PlaceError::ColumnOutOfRange {
                column,
                width: self.width,
            });
        }

        let row = self.column_height(column);
        if row >= self.height {
            return Err(PlaceError::ColumnFull(column));
        }

        self.cells[row * self.width + column] = Cell::Occupied(player);
        trace!(column, row, %player, "Disc placed");
        Ok(Move::new(column, row))
    }

    /// Formats the board as a human-readable string, top row first.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in (0..self.height).rev() {
            result.push('|');
            for column in 0..self.width {
                let symbol = match self.get(column, row) {
                    Some(Cell::Occupied(player)) => player.symbol(),
                    _ => '.',
                };
                result.push(symbol);
                result.push('|');
            }
            result.push('\n');
        }
        for column in 0..self.width {
            result.push(' ');
            result.push_str(&(column % 10).to_string());
        }
        result
    }
}
