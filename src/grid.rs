//! Cell ownership grid.
//!
//! Each cell holds at most one [`AgentId`]. The grid never owns agents; it is
//! a lookup structure kept in lockstep with the [`Roster`](crate::roster::Roster).

use crate::position::{Position, GRID_SIZE};
use crate::roster::AgentId;

/// Total number of cells
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Occupancy map for the habitat
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// cells[row * GRID_SIZE + col] holds the occupant of that cell
    cells: Vec<Option<AgentId>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self {
            cells: vec![None; CELL_COUNT],
        }
    }

    /// Clear all cells
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// True if no agent occupies `pos`. Off-grid positions are never empty.
    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        pos.is_valid() && self.cells[pos.index()].is_none()
    }

    /// Occupant of a cell
    #[inline]
    pub fn agent_at(&self, pos: Position) -> Option<AgentId> {
        if pos.is_valid() {
            self.cells[pos.index()]
        } else {
            None
        }
    }

    /// Put an agent into a cell, overwriting any previous occupant
    #[inline]
    pub fn place(&mut self, id: AgentId, pos: Position) {
        if pos.is_valid() {
            self.cells[pos.index()] = Some(id);
        }
    }

    /// Clear a cell, returning the previous occupant
    #[inline]
    pub fn remove(&mut self, pos: Position) -> Option<AgentId> {
        if pos.is_valid() {
            self.cells[pos.index()].take()
        } else {
            None
        }
    }

    /// Vacate `from` and occupy `to`. The caller updates the agent's own
    /// position in the same step.
    pub fn move_agent(&mut self, id: AgentId, from: Position, to: Position) {
        if !to.is_valid() {
            return;
        }
        debug_assert!(
            self.agent_at(to).map_or(true, |other| other == id),
            "move into occupied cell {}",
            to
        );

        if self.agent_at(from) == Some(id) {
            self.cells[from.index()] = None;
        }
        self.cells[to.index()] = Some(id);
    }

    /// Number of empty cells
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        CELL_COUNT - self.empty_count()
    }

    /// Fraction of occupied cells in [0, 1]
    pub fn occupancy_rate(&self) -> f64 {
        self.occupied_count() as f64 / CELL_COUNT as f64
    }

    /// All empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| Position::from_index(i))
            .collect()
    }

    /// Empty orthogonal neighbours of `pos`
    pub fn empty_neighbors(&self, pos: Position) -> Vec<Position> {
        pos.neighbors().filter(|&n| self.is_empty(n)).collect()
    }

    /// Occupied cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Position, AgentId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|id| (Position::from_index(i), id)))
    }
}
