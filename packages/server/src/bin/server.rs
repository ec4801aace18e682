//! Collaborative drawing server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rakugaki-server
//! cargo run --bin rakugaki-server -- --host 0.0.0.0 --port 3001
//! cargo run --bin rakugaki-server -- --database-url sqlite://rakugaki.db
//! ```

use std::sync::Arc;

use clap::Parser;
use rakugaki_server::{
    domain::{RoomIdGenerator, RoomRepository},
    infrastructure::{
        registry::ChannelRoomRegistry,
        repository::{InMemoryRoomRepository, SqliteRoomRepository},
    },
    ui::{AppState, Server},
};
use rakugaki_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "rakugaki-server")]
#[command(about = "Room synchronization server for collaborative drawing", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RAKUGAKI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "3001")]
    port: u16,

    /// SQLite database URL (e.g. sqlite://rakugaki.db). Rooms are kept in memory when omitted
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "RAKUGAKI_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    // .env is optional
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Clock
    // 2. Repository (Room Store)
    // 3. Registry (fan-out table)
    // 4. AppState (UseCases)
    // 5. Server

    // 1. Clock
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 2. Repository
    let repository: Arc<dyn RoomRepository> = match &args.database_url {
        Some(url) => match SqliteRoomRepository::connect(url, clock.clone()).await {
            Ok(repository) => {
                tracing::info!("Using SQLite room store at {}", url);
                Arc::new(repository)
            }
            Err(e) => {
                tracing::error!("Failed to open room store '{}': {}", url, e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("Using in-memory room store");
            Arc::new(InMemoryRoomRepository::new(clock.clone()))
        }
    };

    // 3. Registry
    let registry = Arc::new(ChannelRoomRegistry::new());

    // 4. AppState
    let state = Arc::new(AppState::new(
        repository,
        registry,
        RoomIdGenerator::new(),
        clock,
    ));

    // 5. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
