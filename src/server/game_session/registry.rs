//! Room registry actor.
//!
//! Allocates room ids, starts one [`Room`] actor per match and resolves ids to
//! room addresses. It holds no game logic.
use actix::prelude::*;
use std::collections::HashMap;
use actix::MessageResult;
use log::{debug, info};

use crate::server::error::RoomError;
use crate::server::game_session::room::{Occupant, Room, RoomId};

pub struct RoomRegistry {
    rooms: HashMap<RoomId, Addr<Room>>,
    /// Last number handed out; never reused, even after a room is reclaimed.
    last_room_number: u64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            last_room_number: 0,
        }
    }

    fn next_room_id(&mut self) -> RoomId {
        self.last_room_number += 1;
        format!("room_{}", self.last_room_number)
    }

    pub fn create_room(&mut self, creator: Occupant, ctx: &mut Context<Self>) -> (RoomId, Addr<Room>) {
        let room_id = self.next_room_id();
        let room = Room::new(room_id.clone(), creator, ctx.address().recipient()).start();
        self.rooms.insert(room_id.clone(), room.clone());
        info!("[Registry] Room {} registered ({} active)", room_id, self.rooms.len());
        (room_id, room)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for RoomRegistry {
    type Context = Context<Self>;
}

/// Message: open a new room with `creator` seated in slot "1".
#[derive(Message)]
#[rtype(result = "(RoomId, Addr<Room>)")]
pub struct CreateRoom {
    pub creator: Occupant,
}

impl Handler<CreateRoom> for RoomRegistry {
    type Result = MessageResult<CreateRoom>;

    fn handle(&mut self, msg: CreateRoom, ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.create_room(msg.creator, ctx))
    }
}

/// Message: resolve a room id.
#[derive(Message)]
#[rtype(result = "Result<Addr<Room>, RoomError>")]
pub struct GetRoom {
    pub room_id: RoomId,
}

impl Handler<GetRoom> for RoomRegistry {
    type Result = Result<Addr<Room>, RoomError>;

    fn handle(&mut self, msg: GetRoom, _: &mut Context<Self>) -> Self::Result {
        self.rooms.get(&msg.room_id)
            .cloned()
            .ok_or(RoomError::RoomNotFound)
    }
}

/// Message: sent by a room once its last player has left.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RoomVacated {
    pub room_id: RoomId,
}

impl Handler<RoomVacated> for RoomRegistry {
    type Result = ();

    fn handle(&mut self, msg: RoomVacated, _: &mut Context<Self>) -> Self::Result {
        if self.rooms.remove(&msg.room_id).is_some() {
            info!("[Registry] Room {} reclaimed ({} active)", msg.room_id, self.rooms.len());
        } else {
            debug!("[Registry] Room {} already gone", msg.room_id);
        }
    }
}

/// Message: number of registered rooms.
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "usize")]
pub struct RoomCount;

#[cfg(test)]
impl Handler<RoomCount> for RoomRegistry {
    type Result = usize;

    fn handle(&mut self, _: RoomCount, _: &mut Context<Self>) -> Self::Result {
        self.rooms.len()
    }
}
