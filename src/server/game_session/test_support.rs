//! Stand-in for a player's connection in actor tests: records every
//! `ServerMessage` a room sends to it.
use actix::prelude::*;
use uuid::Uuid;

use crate::server::game_session::messages::ServerMessage;
use crate::server::game_session::room::Occupant;

#[derive(Default)]
pub struct Probe {
    inbox: Vec<ServerMessage>,
}

impl Actor for Probe {
    type Context = Context<Self>;
}

impl Handler<ServerMessage> for Probe {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.inbox.push(msg);
    }
}

/// Message: hand over (and forget) everything received so far.
#[derive(Message)]
#[rtype(result = "Vec<ServerMessage>")]
struct Drain;

impl Handler<Drain> for Probe {
    type Result = MessageResult<Drain>;

    fn handle(&mut self, _msg: Drain, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(std::mem::take(&mut self.inbox))
    }
}

/// A fake player connection backed by a [`Probe`].
#[derive(Clone)]
pub struct Connection {
    pub connection_id: Uuid,
    pub addr: Addr<Probe>,
}

impl Connection {
    /// Start a probe on the current actix system.
    pub fn open() -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            addr: Probe::default().start(),
        }
    }

    pub fn occupant(&self) -> Occupant {
        Occupant {
            connection_id: self.connection_id,
            outbox: self.addr.clone().recipient(),
        }
    }

    /// Messages delivered so far, oldest first. Anything a room sent before
    /// this call is already queued ahead of the drain request.
    pub async fn drain(&self) -> Vec<ServerMessage> {
        self.addr.send(Drain).await.unwrap_or_default()
    }
}
