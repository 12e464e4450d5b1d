//! Text-mode geometry and cursor coordinates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of rows in the 80x25 text console.
pub const SCREEN_ROWS: usize = 25;

/// Number of columns in the 80x25 text console.
pub const SCREEN_COLS: usize = 80;

/// A cell coordinate on the text console.
///
/// A `CursorPosition` obtained through [`CursorPosition::clamped`] or
/// [`CursorPosition::origin`] always lies inside the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CursorPosition {
    /// Row, `0..=24`.
    pub row: u8,
    /// Column, `0..=79`.
    pub col: u8,
}

impl CursorPosition {
    /// Largest valid row index.
    pub const MAX_ROW: u8 = (SCREEN_ROWS - 1) as u8;
    /// Largest valid column index.
    pub const MAX_COL: u8 = (SCREEN_COLS - 1) as u8;

    /// The top-left cell.
    pub const fn origin() -> Self {
        Self { row: 0, col: 0 }
    }

    /// Builds a position, pulling out-of-range values onto the nearest edge.
    pub fn clamped(row: u8, col: u8) -> Self {
        Self {
            row: row.min(Self::MAX_ROW),
            col: col.min(Self::MAX_COL),
        }
    }

    /// Returns `true` if the position addresses a cell on screen.
    pub fn in_bounds(&self) -> bool {
        self.row <= Self::MAX_ROW && self.col <= Self::MAX_COL
    }

    /// Row as a buffer index.
    pub fn row_index(&self) -> usize {
        usize::from(self.row)
    }

    /// Column as a buffer index.
    pub fn col_index(&self) -> usize {
        usize::from(self.col)
    }
}
