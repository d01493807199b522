//! Game configuration constants.
//! 
//! This module defines the main gameplay parameters such as grid dimensions,
//! the number of planes each player places and the win condition.
use crate::game::types::Slot;

/// Number of rows in the game grid.
pub const GRID_ROW: usize = 10;

/// Number of columns in the game grid.
pub const GRID_COL: usize = 10;

/// Number of cells in a player's grid (flat indices 0..GRID_SIZE).
pub const GRID_SIZE: usize = GRID_ROW * GRID_COL;

/// Planes a player places before the opponent is told they are ready.
pub const PLANES_PER_PLAYER: i64 = 3;

/// Head hits an attacker needs to win the match.
pub const HEAD_HITS_TO_WIN: u32 = 3;

/// Slot that is told it holds the first turn when the battle starts.
pub const FIRST_TURN: Slot = Slot::One;
