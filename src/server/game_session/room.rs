//! Room actor: owns one match and every connection seated in it.
//!
//! Each handler runs a whole transition (mutate, then fan out to the seated
//! connections) without interleaving, since the actor processes its mailbox one
//! message at a time.
use actix::prelude::*;
use std::collections::HashMap;
use log::{debug, info};
use uuid::Uuid;

use crate::config::game::FIRST_TURN;
use crate::game::grid::Grid;
use crate::game::state::MatchState;
use crate::game::types::{CellIndex, Slot};
use crate::server::error::RoomError;
use crate::server::game_session::messages::{AttackReport, ServerMessage};
use crate::server::game_session::registry::RoomVacated;

pub type RoomId = String;

/// Outbound side of a seated connection.
#[derive(Clone)]
pub struct Occupant {
    pub connection_id: Uuid,
    pub outbox: Recipient<ServerMessage>,
}

pub struct Room {
    pub room_id: RoomId,
    state: MatchState,
    occupants: HashMap<Slot, Occupant>,
    registry: Recipient<RoomVacated>,
}

impl Room {
    /// New room with `creator` already seated in slot "1".
    pub fn new(room_id: RoomId, creator: Occupant, registry: Recipient<RoomVacated>) -> Self {
        let mut state = MatchState::new();
        let mut occupants = HashMap::new();
        if let Some(slot) = state.join() {
            occupants.insert(slot, creator);
        }
        Self {
            room_id,
            state,
            occupants,
            registry,
        }
    }

    /// Fire-and-forget delivery to one seat, if it is connected.
    fn send_to(&self, slot: Slot, msg: ServerMessage) {
        if let Some(occupant) = self.occupants.get(&slot) {
            occupant.outbox.do_send(msg);
        }
    }

    /// Deliver a per-recipient message to every seated slot.
    fn broadcast_with(&self, build: impl Fn(Slot) -> ServerMessage) {
        for slot in self.state.seated() {
            self.send_to(slot, build(slot));
        }
    }
}

impl Actor for Room {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Room] {} created", self.room_id);
        self.send_to(Slot::One, ServerMessage::room_created(&self.room_id));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        debug!("[Room] {} stopped", self.room_id);
    }
}

/// Message: a connection asks for the vacant seat.
#[derive(Message)]
#[rtype(result = "Result<Slot, RoomError>")]
pub struct JoinRoom {
    pub occupant: Occupant,
}

/// Message: a seated player reports a placement.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PlacePlane {
    pub slot: Slot,
    pub planes_placed: i64,
    pub positions: Vec<CellIndex>,
}

/// Message: a seated player removed a plane client-side.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RemovePlane {
    pub slot: Slot,
    pub planes_placed: i64,
}

/// Message: a seated player finished placing.
#[derive(Message)]
#[rtype(result = "()")]
pub struct PlayerReady {
    pub slot: Slot,
}

/// Message: a seated player fires at the opponent's board.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Attack {
    pub slot: Slot,
    pub position: CellIndex,
}

/// Message: the connection holding `slot` went away.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub slot: Slot,
    pub connection_id: Uuid,
}

impl Handler<JoinRoom> for Room {
    type Result = Result<Slot, RoomError>;

    fn handle(&mut self, msg: JoinRoom, _ctx: &mut Context<Self>) -> Self::Result {
        let slot = self.state.join().ok_or(RoomError::RoomFull)?;
        self.occupants.insert(slot, msg.occupant);
        info!("[Room] {} slot {} joined, placement starts", self.room_id, slot);

        let state = &self.state;
        self.broadcast_with(|slot| {
            let planes_placed = state.board(slot).map_or(0, |b| b.planes_placed);
            ServerMessage::placement_started(slot, planes_placed)
        });
        Ok(slot)
    }
}

impl Handler<PlacePlane> for Room {
    type Result = ();

    fn handle(&mut self, msg: PlacePlane, _ctx: &mut Context<Self>) -> Self::Result {
        let Some(outcome) = self.state.place_plane(msg.slot, msg.planes_placed, &msg.positions) else {
            return;
        };
        if let Some(board) = self.state.board(msg.slot) {
            debug!(
                "[Room] {} slot {} placed plane #{} at {:?} ({}/{} cells occupied)",
                self.room_id, msg.slot, outcome.planes_placed, msg.positions,
                board.grid.occupied_count(), board.grid.len()
            );
        }

        self.send_to(msg.slot, ServerMessage::PlacementUpdate {
            player_id: None,
            planes_placed: outcome.planes_placed,
            placement_phase: true,
        });
        self.send_to(msg.slot.opponent(), ServerMessage::OpponentPlacementUpdate {
            opponent_ready: outcome.opponent_ready,
            placement_phase: true,
        });
    }
}

impl Handler<RemovePlane> for Room {
    type Result = ();

    fn handle(&mut self, msg: RemovePlane, _ctx: &mut Context<Self>) -> Self::Result {
        if !self.state.remove_plane(msg.slot, msg.planes_placed) {
            return;
        }
        debug!("[Room] {} slot {} now reports {} planes", self.room_id, msg.slot, msg.planes_placed);

        let state = &self.state;
        self.broadcast_with(|slot| ServerMessage::PlacementUpdate {
            player_id: Some(slot),
            planes_placed: state.board(slot).map_or(0, |b| b.planes_placed),
            placement_phase: true,
        });
    }
}

impl Handler<PlayerReady> for Room {
    type Result = ();

    fn handle(&mut self, msg: PlayerReady, _ctx: &mut Context<Self>) -> Self::Result {
        if !self.state.mark_ready(msg.slot) {
            debug!("[Room] {} slot {} ready ({:?})", self.room_id, msg.slot, self.state.phase());
            return;
        }
        info!("[Room] {} both players ready, battle starts", self.room_id);
        self.broadcast_with(|slot| ServerMessage::battle_started(slot, slot == FIRST_TURN));
    }
}

impl Handler<Attack> for Room {
    type Result = ();

    fn handle(&mut self, msg: Attack, _ctx: &mut Context<Self>) -> Self::Result {
        let outcome = self.state.attack(msg.slot, msg.position);
        match Grid::index(msg.position) {
            Some(index) => debug!(
                "[Room] {} slot {} attacks {:?}: hit={} head={}",
                self.room_id, msg.slot, Grid::coordinates(index), outcome.is_hit, outcome.is_head_hit
            ),
            None => debug!("[Room] {} slot {} attacks off-grid {}", self.room_id, msg.slot, msg.position),
        }
        if outcome.game_over {
            info!("[Room] {} game over, winner slot {}", self.room_id, outcome.winner);
        }

        let report = AttackReport::from(outcome);
        self.send_to(msg.slot, ServerMessage::AttackResult(report.clone()));
        self.send_to(msg.slot.opponent(), ServerMessage::OpponentAttack(report));
    }
}

impl Handler<Leave> for Room {
    type Result = ();

    fn handle(&mut self, msg: Leave, ctx: &mut Context<Self>) -> Self::Result {
        match self.occupants.get(&msg.slot) {
            Some(occupant) if occupant.connection_id == msg.connection_id => {}
            _ => {
                debug!("[Room] {} ignored stale leave for slot {}", self.room_id, msg.slot);
                return;
            }
        }
        self.occupants.remove(&msg.slot);
        self.state.leave(msg.slot);
        info!("[Room] {} slot {} left ({:?})", self.room_id, msg.slot, self.state.phase());

        self.send_to(msg.slot.opponent(), ServerMessage::OpponentDisconnected);

        if self.state.is_empty() {
            self.registry.do_send(RoomVacated {
                room_id: self.room_id.clone(),
            });
            ctx.stop();
        }
    }
}

/// Message: copy of the match state, for assertions in tests.
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "MatchState")]
pub struct Snapshot;

#[cfg(test)]
impl Handler<Snapshot> for Room {
    type Result = MessageResult<Snapshot>;

    fn handle(&mut self, _msg: Snapshot, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.state.clone())
    }
}
