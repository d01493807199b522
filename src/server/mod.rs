// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the backend server components:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Game session orchestration (room registry, rooms, player connections)
//! - Domain errors reported to clients

pub mod state;
pub mod router;
pub mod game_session;
pub mod error;
