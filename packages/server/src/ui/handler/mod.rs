//! Request handlers.

mod http;
mod websocket;

pub use http::{fallback, health_check, list_rooms, open_room, room_detail};
pub use websocket::websocket_handler;
