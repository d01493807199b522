//! HTTP and WebSocket routing configuration.
//!
//! A single endpoint carries the game protocol; every connection is handled by
//! its own session actor.

use actix_web::web;
use crate::config::server::WS_PATH;
use crate::server::game_session::session::ws_game;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(WS_PATH)
            .to(ws_game)
    );
}
