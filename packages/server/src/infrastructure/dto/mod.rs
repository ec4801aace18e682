//! Data Transfer Objects (DTOs) for the drawing server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs
//! - `http`: HTTP API request/response DTOs
//! - `record`: drawing history records (persisted layout, also sent as history)

pub mod conversion;
pub mod http;
pub mod record;
pub mod websocket;
