//! Grid coordinates and neighbourhood queries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the square habitat
pub const GRID_SIZE: usize = 10;

/// Orthogonal offsets in (row, col) form: north, south, west, east
pub const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A cell coordinate on the habitat grid.
///
/// Positions are plain values and may be constructed out of bounds; every
/// grid operation checks [`Position::is_valid`] before touching a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Check whether the coordinate lies inside the grid
    #[inline]
    pub fn is_valid(&self) -> bool {
        let n = GRID_SIZE as i32;
        self.row >= 0 && self.row < n && self.col >= 0 && self.col < n
    }

    /// Manhattan distance
    #[inline]
    pub fn distance(&self, other: &Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// Chessboard distance, used for radius scans
    #[inline]
    pub fn chebyshev(&self, other: &Position) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Orthogonally adjacent (Manhattan distance of exactly one)
    #[inline]
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }

    /// Shift by an offset, returning `None` when the result leaves the grid
    pub fn offset(&self, d_row: i32, d_col: i32) -> Option<Position> {
        let pos = Position::new(self.row + d_row, self.col + d_col);
        pos.is_valid().then_some(pos)
    }

    /// Valid orthogonal neighbours in north, south, west, east order
    pub fn neighbors(&self) -> impl Iterator<Item = Position> {
        let origin = *self;
        ORTHOGONAL
            .iter()
            .filter_map(move |&(dr, dc)| origin.offset(dr, dc))
    }

    /// Valid cells within a Chebyshev radius, excluding this cell, row-major
    pub fn within(&self, radius: i32) -> Vec<Position> {
        let n = GRID_SIZE as i32 - 1;
        let mut cells = Vec::new();

        for row in self.row.saturating_sub(radius).max(0)..=self.row.saturating_add(radius).min(n) {
            for col in self.col.saturating_sub(radius).max(0)..=self.col.saturating_add(radius).min(n) {
                let pos = Position::new(row, col);
                if pos != *self {
                    cells.push(pos);
                }
            }
        }

        cells
    }

    /// Row-major index into a flat cell array. Only meaningful for valid positions.
    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.row as usize * GRID_SIZE + self.col as usize
    }

    /// Inverse of [`Position::index`]
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self::new((index / GRID_SIZE) as i32, (index % GRID_SIZE) as i32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}
