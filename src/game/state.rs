use std::collections::HashMap;

use crate::config::game::{HEAD_HITS_TO_WIN, PLANES_PER_PLAYER};
use crate::game::grid::Grid;
use crate::game::types::{AttackOutcome, CellIndex, MatchPhase, PlacementOutcome, Slot};

/// Everything a seated player owns inside a room.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerBoard {
    /// Count as last reported by the client.
    pub planes_placed: i64,
    pub grid: Grid,
    /// First coordinate of every placement, in placement order.
    pub plane_heads: Vec<CellIndex>,
    /// Heads this player has struck on the opponent's board.
    pub head_hits: u32,
    pub ready: bool,
}

/// State of one match: at most two seated players and their boards.
///
/// Pure data; the owning room actor serialises access and turns the
/// returned outcomes into wire messages.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    boards: HashMap<Slot, PlayerBoard>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat a new player in the first vacant slot. `None` when the room is full.
    pub fn join(&mut self) -> Option<Slot> {
        let slot = Slot::ALL.into_iter().find(|slot| !self.boards.contains_key(slot))?;
        self.boards.insert(slot, PlayerBoard::default());
        Some(slot)
    }

    /// Drop every trace of `slot`. Returns false if it was not seated.
    pub fn leave(&mut self, slot: Slot) -> bool {
        self.boards.remove(&slot).is_some()
    }

    pub fn board(&self, slot: Slot) -> Option<&PlayerBoard> {
        self.boards.get(&slot)
    }

    pub fn is_seated(&self, slot: Slot) -> bool {
        self.boards.contains_key(&slot)
    }

    /// Seated slots in id order.
    pub fn seated(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL.into_iter().filter(|&slot| self.is_seated(slot))
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.boards.len() == Slot::ALL.len()
    }

    pub fn phase(&self) -> MatchPhase {
        if self.boards.values().any(|b| b.head_hits >= HEAD_HITS_TO_WIN) {
            return MatchPhase::GameOver;
        }
        if !self.is_full() {
            return MatchPhase::AwaitingOpponent;
        }
        match self.boards.values().filter(|b| b.ready).count() {
            0 => MatchPhase::Placement,
            1 => MatchPhase::ReadyWait,
            _ => MatchPhase::Battle,
        }
    }

    /// Record a placement. The client-reported count replaces the stored one;
    /// the first coordinate becomes a plane head and every in-grid coordinate
    /// is marked occupied.
    pub fn place_plane(
        &mut self,
        slot: Slot,
        planes_placed: i64,
        positions: &[CellIndex],
    ) -> Option<PlacementOutcome> {
        let board = self.boards.get_mut(&slot)?;
        board.planes_placed = planes_placed;
        if let Some(&head) = positions.first() {
            board.plane_heads.push(head);
            board.grid.occupy(positions);
        }
        Some(PlacementOutcome {
            planes_placed,
            opponent_ready: planes_placed >= PLANES_PER_PLAYER,
        })
    }

    /// Overwrite the planes-placed count and clear readiness.
    ///
    /// Grid cells and plane heads recorded by earlier placements stay as they are.
    pub fn remove_plane(&mut self, slot: Slot, planes_placed: i64) -> bool {
        match self.boards.get_mut(&slot) {
            Some(board) => {
                board.planes_placed = planes_placed;
                board.ready = false;
                true
            }
            None => false,
        }
    }

    /// Mark `slot` ready. Returns true when both seats are now ready, i.e. the
    /// battle (re)starts.
    pub fn mark_ready(&mut self, slot: Slot) -> bool {
        if let Some(board) = self.boards.get_mut(&slot) {
            board.ready = true;
        }
        Slot::ALL
            .iter()
            .all(|slot| self.boards.get(slot).is_some_and(|b| b.ready))
    }

    /// Resolve `attacker` firing at `position` on the opponent's board.
    ///
    /// Positions off the board, or an empty opponent seat, resolve to a miss.
    /// Head hits are credited to the attacker, and striking the same head
    /// again counts again.
    pub fn attack(&mut self, attacker: Slot, position: CellIndex) -> AttackOutcome {
        let (is_hit, is_head_hit) = match (self.boards.get(&attacker.opponent()), Grid::index(position)) {
            (Some(defender), Some(_)) => (
                defender.grid.is_occupied(position),
                defender.plane_heads.contains(&position),
            ),
            _ => (false, false),
        };

        let head_hits = match self.boards.get_mut(&attacker) {
            Some(board) => {
                if is_head_hit {
                    board.head_hits += 1;
                }
                board.head_hits
            }
            None => 0,
        };

        AttackOutcome {
            position,
            is_hit,
            is_head_hit,
            head_hits,
            game_over: head_hits >= HEAD_HITS_TO_WIN,
            winner: attacker,
        }
    }
}
