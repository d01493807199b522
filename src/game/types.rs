use serde::{Serialize, Deserialize};
use std::fmt;

/// Flat, 0-based cell index as sent by clients.
///
/// Kept signed and unbounded: out-of-grid values are legal on the wire and
/// are resolved as misses or ignored cells rather than rejected.
pub type CellIndex = i64;

/// One of the two seats in a room. Serialized as `"1"` / `"2"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    /// The other seat in the same room.
    pub fn opponent(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::One => f.write_str("1"),
            Slot::Two => f.write_str("2"),
        }
    }
}

/// Match phase, derived from the per-slot state on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    AwaitingOpponent,
    Placement,
    ReadyWait,
    Battle,
    GameOver,
}

/// What a `place_plane` changed, as reported back to both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub planes_placed: i64,
    /// True once the placing slot reports at least the full set of planes.
    pub opponent_ready: bool,
}

/// Resolution of a single attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub position: CellIndex,
    pub is_hit: bool,
    pub is_head_hit: bool,
    /// Attacker's head-hit total after this attack.
    pub head_hits: u32,
    pub game_over: bool,
    /// Always the attacker; only meaningful once `game_over` is set.
    pub winner: Slot,
}
