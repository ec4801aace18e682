//! Room Registry の実装
//!
//! - `channel`: tokio の mpsc チャンネルで各接続へ配信する実装

pub mod channel;

pub use channel::ChannelRoomRegistry;
