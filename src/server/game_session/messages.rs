//! Wire protocol: JSON objects tagged by a `type` field.
//!
//! Inbound frames decode once into [`ClientMessage`]; everything sent back to a
//! browser is a [`ServerMessage`], which doubles as the actix message delivered
//! to a player's session actor.
use actix::prelude::*;
use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::game::types::{AttackOutcome, CellIndex, Slot};

/// Message client -> serveur.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom,
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_id: String,
    },
    #[serde(rename_all = "camelCase")]
    PlacePlane {
        #[serde(default)]
        positions: Vec<CellIndex>,
        #[serde(default)]
        planes_placed: i64,
    },
    #[serde(rename_all = "camelCase")]
    RemovePlane {
        #[serde(default)]
        planes_placed: i64,
    },
    PlayerReady,
    Attack {
        #[serde(default)]
        position: CellIndex,
    },
    /// Any `type` this server does not know; dropped by the session.
    #[serde(other)]
    Unknown,
}

/// Fields every inbound frame may carry, whatever its `type`. A value of the
/// wrong JSON type fails the whole frame, even where the variant ignores it.
#[allow(dead_code)]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameFields {
    room_id: Option<String>,
    player_id: Option<String>,
    data: Option<serde::de::IgnoredAny>,
    position: Option<CellIndex>,
    is_hit: Option<bool>,
    is_head_hit: Option<bool>,
    head_hits: Option<i64>,
    game_over: Option<bool>,
    winner: Option<String>,
    planes_placed: Option<i64>,
    opponent_ready: Option<bool>,
    placement_phase: Option<bool>,
    my_turn: Option<bool>,
    positions: Option<Vec<CellIndex>>,
}

/// Decode one inbound frame.
pub fn decode(text: &str) -> Result<ClientMessage, serde_json::Error> {
    let frame: Value = serde_json::from_str(text)?;
    FrameFields::deserialize(&frame)?;
    ClientMessage::deserialize(frame)
}

/// Attack resolution as seen by one of the two players.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttackReport {
    pub position: CellIndex,
    pub is_hit: bool,
    pub is_head_hit: bool,
    pub head_hits: u32,
    pub game_over: bool,
    pub winner: Slot,
    pub my_turn: bool,
}

impl From<AttackOutcome> for AttackReport {
    fn from(outcome: AttackOutcome) -> Self {
        Self {
            position: outcome.position,
            is_hit: outcome.is_hit,
            is_head_hit: outcome.is_head_hit,
            head_hits: outcome.head_hits,
            game_over: outcome.game_over,
            winner: outcome.winner,
            my_turn: !outcome.game_over,
        }
    }
}

// Message serveur -> client
#[derive(Message, Serialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: String,
        player_id: Slot,
        placement_phase: bool,
        planes_placed: i64,
    },
    Error {
        data: String,
    },
    #[serde(rename_all = "camelCase")]
    GameStart {
        player_id: Slot,
        placement_phase: bool,
        my_turn: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        planes_placed: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    PlacementUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<Slot>,
        planes_placed: i64,
        placement_phase: bool,
    },
    #[serde(rename_all = "camelCase")]
    OpponentPlacementUpdate {
        opponent_ready: bool,
        placement_phase: bool,
    },
    AttackResult(AttackReport),
    OpponentAttack(AttackReport),
    OpponentDisconnected,
}

impl ServerMessage {
    pub fn room_created(room_id: &str) -> Self {
        Self::RoomCreated {
            room_id: room_id.to_string(),
            player_id: Slot::One,
            placement_phase: true,
            planes_placed: 0,
        }
    }
    pub fn error(message: &str) -> Self {
        Self::Error { data: message.to_string() }
    }
    pub fn placement_started(player_id: Slot, planes_placed: i64) -> Self {
        Self::GameStart {
            player_id,
            placement_phase: true,
            my_turn: false,
            planes_placed: Some(planes_placed),
        }
    }
    pub fn battle_started(player_id: Slot, my_turn: bool) -> Self {
        Self::GameStart {
            player_id,
            placement_phase: false,
            my_turn,
            planes_placed: None,
        }
    }

    /// Encode for a text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
