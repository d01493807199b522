//! Domain errors raised while resolving or seating a player in a room.
//!
//! None of these are fatal: the session turns them into an `error` message for
//! the requesting connection only.
use actix::MailboxError;
use thiserror::Error;

use crate::server::game_session::messages::ServerMessage;

#[derive(Error, Debug)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Room unavailable: {0}")]
    Unavailable(#[from] MailboxError),
}

impl RoomError {
    /// Wire message reported to the requester.
    pub fn to_client_message(&self) -> ServerMessage {
        ServerMessage::error(&self.to_string())
    }
}
