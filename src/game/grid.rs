use crate::config::game::{GRID_COL, GRID_SIZE};
use crate::game::types::CellIndex;

/// One player's hidden board: `true` marks a cell covered by a plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<bool>,
}

impl Grid {
    /// Fresh board with every cell unoccupied.
    pub fn new() -> Self {
        Self { cells: vec![false; GRID_SIZE] }
    }

    /// Map a wire index onto the board, `None` when it falls outside.
    pub fn index(position: CellIndex) -> Option<usize> {
        usize::try_from(position).ok().filter(|&i| i < GRID_SIZE)
    }

    /// (row, col) of an in-grid index, for log output.
    pub fn coordinates(index: usize) -> (usize, usize) {
        (index / GRID_COL, index % GRID_COL)
    }

    /// Mark every in-grid position as occupied; others are skipped.
    pub fn occupy(&mut self, positions: &[CellIndex]) {
        for index in positions.iter().copied().filter_map(Self::index) {
            self.cells[index] = true;
        }
    }

    /// Occupancy at `position`; anything off the board reads as empty.
    pub fn is_occupied(&self, position: CellIndex) -> bool {
        Self::index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
