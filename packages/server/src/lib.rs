//! Room synchronization server for a collaborative drawing board.
//!
//! Clients join a room over WebSocket, receive the drawing history, and see
//! each other's strokes and cursors in real time.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
