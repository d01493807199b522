//! Match logic for a two-player plane battle: seats, hidden boards,
//! placements and attack resolution. No I/O lives here.
pub mod types;
pub mod grid;
pub mod state;
