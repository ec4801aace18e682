//! WebSocket / HTTP server.

pub mod error;
mod handler;
mod server;
pub mod session;
mod signal;
pub mod state;

pub use server::Server;
pub use session::{Session, SessionState};
pub use state::AppState;
