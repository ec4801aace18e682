//! Room Repository の実装
//!
//! - `inmemory`: プロセス内の HashMap（デフォルト）
//! - `sqlite`: SQLite による永続化（`--database-url` 指定時）

pub mod inmemory;
pub mod sqlite;

pub use inmemory::InMemoryRoomRepository;
pub use sqlite::SqliteRoomRepository;
