//! WebSocket session for one player connection.
//!
//! Decodes inbound frames, resolves which room and slot they belong to, and
//! forwards them to the room actor. Messages the room sends back arrive as
//! [`ServerMessage`]s and are written out as text frames.
use actix::dev::ToEnvelope;
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, error, warn};
use uuid::Uuid;

use crate::game::types::Slot;
use crate::server::error::RoomError;
use crate::server::game_session::messages::{self, ClientMessage, ServerMessage};
use crate::server::game_session::registry::{CreateRoom, GetRoom, RoomRegistry};
use crate::server::game_session::room::{
    Attack, JoinRoom, Leave, Occupant, PlacePlane, PlayerReady, RemovePlane, Room, RoomId,
};

/// Room and slot a connection has been seated in.
struct Seat {
    room_id: RoomId,
    room: Addr<Room>,
    slot: Slot,
}

pub struct PlayerSession {
    pub connection_id: Uuid,
    registry: Addr<RoomRegistry>,
    seat: Option<Seat>,
}

impl PlayerSession {
    pub fn new(registry: Addr<RoomRegistry>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            registry,
            seat: None,
        }
    }

    fn occupant(&self, ctx: &mut ws::WebsocketContext<Self>) -> Occupant {
        Occupant {
            connection_id: self.connection_id,
            outbox: ctx.address().recipient(),
        }
    }

    /// Serialize and write a message to this connection.
    fn send(&self, msg: &ServerMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg.encode() {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: close the connection.
                error!("[Session] {} failed to serialize {:?}: {}", self.connection_id, msg, e);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }

    /// Decode one frame and dispatch it. A frame that does not decode ends
    /// the connection.
    fn handle_frame(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match messages::decode(text) {
            Ok(msg) => self.dispatch(msg, ctx),
            Err(e) => {
                warn!("[Session] {} sent an undecodable frame: {}", self.connection_id, e);
                ctx.stop();
            }
        }
    }

    fn dispatch(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        debug!("[Session] {} -> {:?}", self.connection_id, msg);
        match msg {
            ClientMessage::CreateRoom => self.create_room(ctx),
            ClientMessage::JoinRoom { room_id } => self.join_room(room_id, ctx),
            ClientMessage::PlacePlane { positions, planes_placed } => {
                self.forward(|slot| PlacePlane { slot, planes_placed, positions })
            }
            ClientMessage::RemovePlane { planes_placed } => {
                self.forward(|slot| RemovePlane { slot, planes_placed })
            }
            ClientMessage::PlayerReady => self.forward(|slot| PlayerReady { slot }),
            ClientMessage::Attack { position } => self.forward(|slot| Attack { slot, position }),
            ClientMessage::Unknown => {
                debug!("[Session] {} ignored message of unknown type", self.connection_id);
            }
        }
    }

    /// Send a slot-scoped command to the room this connection sits in.
    /// Without a room the command is dropped.
    fn forward<M>(&self, build: impl FnOnce(Slot) -> M)
    where
        M: Message + Send + 'static,
        M::Result: Send,
        Room: Handler<M>,
        <Room as Actor>::Context: ToEnvelope<Room, M>,
    {
        match &self.seat {
            Some(seat) => seat.room.do_send(build(seat.slot)),
            None => debug!("[Session] {} has no room, message dropped", self.connection_id),
        }
    }

    /// Ask the registry for a new room. Frames stay queued until it answers.
    fn create_room(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let creator = self.occupant(ctx);
        let request = self
            .registry
            .send(CreateRoom { creator })
            .into_actor(self)
            .map(|res, act, ctx| match res {
                Ok((room_id, room)) => act.take_seat(Seat { room_id, room, slot: Slot::One }),
                Err(e) => {
                    error!("[Session] {} could not reach the registry: {}", act.connection_id, e);
                    act.send(&RoomError::from(e).to_client_message(), ctx);
                }
            });
        ctx.wait(request);
    }

    /// Resolve `room_id` and take its vacant seat. Failures are reported to
    /// this connection only.
    fn join_room(&mut self, room_id: RoomId, ctx: &mut ws::WebsocketContext<Self>) {
        if self.seat.as_ref().is_some_and(|seat| seat.room_id == room_id) {
            debug!("[Session] {} already sits in {}, join ignored", self.connection_id, room_id);
            return;
        }
        let registry = self.registry.clone();
        let occupant = self.occupant(ctx);
        let request = async move {
            let room = registry.send(GetRoom { room_id: room_id.clone() }).await??;
            enter_room(room_id, room, occupant).await
        }
        .into_actor(self)
        .map(|res, act, ctx| match res {
            Ok(seat) => act.take_seat(seat),
            Err(e) => {
                debug!("[Session] {} join refused: {}", act.connection_id, e);
                act.send(&e.to_client_message(), ctx);
            }
        });
        ctx.wait(request);
    }

    fn take_seat(&mut self, seat: Seat) {
        debug!(
            "[Session] {} seated in {} as slot {}",
            self.connection_id, seat.room_id, seat.slot
        );
        self.release_seat();
        self.seat = Some(seat);
    }

    /// Give up the current seat, if any; the room runs its disconnect transition.
    fn release_seat(&mut self) {
        if let Some(seat) = self.seat.take() {
            debug!("[Session] {} leaving {}", self.connection_id, seat.room_id);
            seat.room.do_send(Leave {
                slot: seat.slot,
                connection_id: self.connection_id,
            });
        }
    }
}

/// Claim the vacant seat of a room that was just looked up.
async fn enter_room(room_id: RoomId, room: Addr<Room>, occupant: Occupant) -> Result<Seat, RoomError> {
    // A room reclaimed since the lookup has a closed mailbox.
    let slot = room
        .send(JoinRoom { occupant })
        .await
        .map_err(|_| RoomError::RoomNotFound)??;
    Ok(Seat { room_id, room, slot })
}

impl Actor for PlayerSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        debug!("[Session] {} connected", self.connection_id);
    }

    /// Called when the session stops. Frees the seat so the opponent is told.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.release_seat();
        debug!("[Session] {} disconnected", self.connection_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => self.handle_frame(&text, ctx),
            Ok(ws::Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => self.handle_frame(text, ctx),
                Err(e) => {
                    warn!("[Session] {} sent a non UTF-8 binary frame: {}", self.connection_id, e);
                    ctx.stop();
                }
            },
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => (),
            Err(e) => {
                warn!("[Session] {} protocol error: {}", self.connection_id, e);
                ctx.stop();
            }
        }
    }
}

impl Handler<ServerMessage> for PlayerSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        self.send(&msg, ctx);
    }
}

/// WebSocket endpoint for the game protocol. One connection is one player.
pub async fn ws_game(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(PlayerSession::new(data.registry.clone()), &req, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use actix::clock::timeout;
    use actix_web::App;
    use actix_web_actors::ws::{Frame, Message as WsMessage, ProtocolError};
    use futures::{Sink, SinkExt, Stream, StreamExt};
    use serde_json::{json, Value};

    use crate::config::server::WS_PATH;
    use crate::server::game_session::test_support::Connection;
    use crate::server::router;
    use crate::server::state::AppState;

    /// Full HTTP stack around a fresh registry, as `main` builds it.
    fn start_server() -> actix_test::TestServer {
        let state = web::Data::new(AppState::new(RoomRegistry::new().start()));
        actix_test::start(move || App::new().app_data(state.clone()).configure(router::config))
    }

    /// Open a client connection to `url`.
    async fn connect(
        url: String,
    ) -> impl Sink<WsMessage, Error = ProtocolError> + Stream<Item = Result<Frame, ProtocolError>> + Unpin {
        let (_, conn) = awc::Client::new().ws(url).connect().await.unwrap();
        conn
    }

    async fn send_text<C>(conn: &mut C, text: &str)
    where
        C: Sink<WsMessage, Error = ProtocolError> + Unpin,
    {
        conn.send(WsMessage::Text(text.into())).await.unwrap();
    }

    /// Next text frame, parsed as JSON.
    async fn next_json<C>(conn: &mut C) -> Value
    where
        C: Stream<Item = Result<Frame, ProtocolError>> + Unpin,
    {
        loop {
            let frame = timeout(Duration::from_secs(5), conn.next())
                .await
                .expect("no frame within 5s");
            match frame {
                Some(Ok(Frame::Text(bytes))) => return serde_json::from_slice(&bytes).unwrap(),
                Some(Ok(Frame::Ping(_))) | Some(Ok(Frame::Pong(_))) => continue,
                other => panic!("unexpected frame {other:?}"),
            }
        }
    }

    fn placement_start(player_id: &str, planes_placed: i64) -> Value {
        json!({"type":"game_start","playerId":player_id,"placementPhase":true,"myTurn":false,"planesPlaced":planes_placed})
    }

    #[actix::test]
    async fn test_frames_without_a_room_are_dropped() {
        let srv = start_server();
        let mut host = connect(srv.url(WS_PATH)).await;

        // Neither produces a reply; the first frame back answers `create_room`.
        send_text(&mut host, r#"{"type":"attack","position":3}"#).await;
        send_text(&mut host, r#"{"type":"place_plane","positions":[1,2],"planesPlaced":1}"#).await;
        send_text(&mut host, r#"{"type":"remove_plane","planesPlaced":0}"#).await;
        send_text(&mut host, r#"{"type":"player_ready"}"#).await;
        send_text(&mut host, r#"{"type":"chat","data":"hi"}"#).await;
        send_text(&mut host, r#"{"type":"create_room"}"#).await;

        assert_eq!(
            next_json(&mut host).await,
            json!({"type":"room_created","roomId":"room_1","playerId":"1","placementPhase":true,"planesPlaced":0})
        );
    }

    #[actix::test]
    async fn test_session_routes_a_match_over_websocket() {
        let srv = start_server();
        let mut host = connect(srv.url(WS_PATH)).await;
        let mut guest = connect(srv.url(WS_PATH)).await;

        send_text(&mut host, r#"{"type":"create_room"}"#).await;
        assert_eq!(next_json(&mut host).await["roomId"], json!("room_1"));

        send_text(&mut guest, r#"{"type":"join_room","roomId":"room_9"}"#).await;
        assert_eq!(next_json(&mut guest).await, json!({"type":"error","data":"Room not found"}));

        send_text(&mut guest, r#"{"type":"join_room","roomId":"room_1"}"#).await;
        assert_eq!(next_json(&mut host).await, placement_start("1", 0));
        assert_eq!(next_json(&mut guest).await, placement_start("2", 0));

        send_text(&mut guest, r#"{"type":"place_plane","positions":[40,41,42],"planesPlaced":1}"#).await;
        assert_eq!(
            next_json(&mut guest).await,
            json!({"type":"placement_update","planesPlaced":1,"placementPhase":true})
        );
        assert_eq!(
            next_json(&mut host).await,
            json!({"type":"opponent_placement_update","opponentReady":false,"placementPhase":true})
        );

        send_text(&mut host, r#"{"type":"attack","position":40}"#).await;
        let result = next_json(&mut host).await;
        assert_eq!(result["type"], json!("attack_result"));
        assert_eq!(result["isHeadHit"], json!(true));
        assert_eq!(result["headHits"], json!(1));
        let seen = next_json(&mut guest).await;
        assert_eq!(seen["type"], json!("opponent_attack"));
        assert_eq!(seen["winner"], json!("1"));
    }

    #[actix::test]
    async fn test_undecodable_frame_disconnects_sender() {
        let srv = start_server();
        let mut host = connect(srv.url(WS_PATH)).await;
        let mut guest = connect(srv.url(WS_PATH)).await;

        send_text(&mut host, r#"{"type":"create_room"}"#).await;
        next_json(&mut host).await;
        send_text(&mut guest, r#"{"type":"join_room","roomId":"room_1"}"#).await;
        next_json(&mut host).await;
        next_json(&mut guest).await;

        send_text(&mut guest, "garbage").await;
        assert_eq!(next_json(&mut host).await, json!({"type":"opponent_disconnected"}));
    }

    #[actix::test]
    async fn test_creating_another_room_releases_previous_seat() {
        let srv = start_server();
        let mut host = connect(srv.url(WS_PATH)).await;
        let mut guest = connect(srv.url(WS_PATH)).await;

        send_text(&mut host, r#"{"type":"create_room"}"#).await;
        next_json(&mut host).await;
        send_text(&mut guest, r#"{"type":"join_room","roomId":"room_1"}"#).await;
        next_json(&mut host).await;
        next_json(&mut guest).await;

        send_text(&mut guest, r#"{"type":"create_room"}"#).await;
        assert_eq!(next_json(&mut guest).await["roomId"], json!("room_2"));
        assert_eq!(next_json(&mut host).await, json!({"type":"opponent_disconnected"}));

        // The released seat is open again.
        let mut newcomer = connect(srv.url(WS_PATH)).await;
        send_text(&mut newcomer, r#"{"type":"join_room","roomId":"room_1"}"#).await;
        assert_eq!(next_json(&mut newcomer).await, placement_start("2", 0));
        assert_eq!(next_json(&mut host).await, placement_start("1", 0));
    }

    #[actix::test]
    async fn test_joining_own_room_keeps_seat() {
        let srv = start_server();
        let mut host = connect(srv.url(WS_PATH)).await;
        let mut guest = connect(srv.url(WS_PATH)).await;

        send_text(&mut host, r#"{"type":"create_room"}"#).await;
        next_json(&mut host).await;
        send_text(&mut host, r#"{"type":"join_room","roomId":"room_1"}"#).await;
        send_text(&mut host, r#"{"type":"place_plane","positions":[5,6],"planesPlaced":1}"#).await;
        // The join produced nothing and the placement still lands in slot "1".
        assert_eq!(
            next_json(&mut host).await,
            json!({"type":"placement_update","planesPlaced":1,"placementPhase":true})
        );

        send_text(&mut guest, r#"{"type":"join_room","roomId":"room_1"}"#).await;
        assert_eq!(next_json(&mut guest).await, placement_start("2", 0));
        assert_eq!(next_json(&mut host).await, placement_start("1", 1));
    }

    #[actix::test]
    async fn test_room_reclaimed_after_lookup_reads_as_not_found() {
        let registry = RoomRegistry::new().start();
        let creator = Connection::open();
        let (room_id, room) = registry.send(CreateRoom { creator: creator.occupant() }).await.unwrap();
        room.send(Leave { slot: Slot::One, connection_id: creator.connection_id })
            .await
            .unwrap();

        let late = Connection::open();
        let Err(e) = enter_room(room_id, room, late.occupant()).await else {
            panic!("seated in a reclaimed room");
        };
        assert!(matches!(e, RoomError::RoomNotFound));
        assert_eq!(e.to_client_message(), ServerMessage::error("Room not found"));
    }
}
