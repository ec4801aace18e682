//! チャンネルベースの RoomRegistry 実装
//!
//! ## 責務
//!
//! - Room ごとに、接続 ID と `UnboundedSender` の対応を保持
//! - 送信者以外への配信（broadcast_except）
//!
//! ## 設計ノート
//!
//! 送信チャンネルの生成は UI 層（`ui/handler/websocket.rs`）で行われ、
//! この実装は受け取った sender を Room 単位で管理するだけです。
//!
//! ロックは 2 段です。
//!
//! - 外側: `RwLock<HashMap<RoomId, Arc<RoomChannels>>>`
//! - 内側: Room ごとの `RwLock<HashMap<ConnectionId, PusherChannel>>`（`RoomChannels`）
//!
//! 外側のロックを保持したまま内側のロックを待つことはありません。
//! 空になった Room は `retired` を立ててからテーブルから外し、
//! 同時に登録しようとした側は新しい Arc で登録し直します。

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionId, PusherChannel, RoomId, RoomRegistry};

/// 1 つの Room の配信先
#[derive(Default)]
struct RoomChannels {
    /// 空になってテーブルから外される途中。以降この Arc には登録しない
    retired: AtomicBool,
    connections: RwLock<HashMap<ConnectionId, PusherChannel>>,
}

/// チャンネルベースの RoomRegistry 実装
#[derive(Default)]
pub struct ChannelRoomRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<RoomChannels>>>,
}

impl ChannelRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn channels(&self, room_id: &RoomId) -> Option<Arc<RoomChannels>> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }

    /// 登録先の Arc を取得する（退役済みなら新しいものに差し替える）
    async fn channels_for_register(&self, room_id: &RoomId) -> Arc<RoomChannels> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.entry(room_id.clone()).or_default();
        if entry.retired.load(Ordering::Acquire) {
            *entry = Arc::default();
        }
        entry.clone()
    }

    /// 配信テーブルに載っている Room の数
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[async_trait]
impl RoomRegistry for ChannelRoomRegistry {
    async fn register(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        channel: PusherChannel,
    ) {
        // 外側のロックは Arc を取り出したら手放す
        loop {
            let channels = self.channels_for_register(room_id).await;
            let mut connections = channels.connections.write().await;
            if channels.retired.load(Ordering::Acquire) {
                continue;
            }
            connections.insert(connection_id.clone(), channel);
            break;
        }

        tracing::debug!(
            "Connection '{}' registered to room '{}'",
            connection_id,
            room_id
        );
    }

    async fn unregister(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let Some(channels) = self.channels(room_id).await else {
            return false;
        };

        let (removed, emptied) = {
            let mut connections = channels.connections.write().await;
            let removed = connections.remove(connection_id).is_some();
            let emptied = connections.is_empty();
            if emptied {
                channels.retired.store(true, Ordering::Release);
            }
            (removed, emptied)
        };

        if emptied {
            let mut rooms = self.rooms.write().await;
            if rooms
                .get(room_id)
                .is_some_and(|current| Arc::ptr_eq(current, &channels))
            {
                rooms.remove(room_id);
                tracing::debug!("Room '{}' has no connections, dropped from registry", room_id);
            }
        }

        if removed {
            tracing::debug!(
                "Connection '{}' unregistered from room '{}'",
                connection_id,
                room_id
            );
        }
        removed
    }

    async fn broadcast_except(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        content: &str,
    ) -> usize {
        let Some(channels) = self.channels(room_id).await else {
            return 0;
        };
        let connections = channels.connections.read().await;

        let mut delivered = 0;
        for (target, channel) in connections.iter() {
            if target == sender {
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            if let Err(e) = channel.send(content.to_string()) {
                tracing::warn!("Failed to push message to connection '{}': {}", target, e);
            } else {
                delivered += 1;
            }
        }

        tracing::debug!(
            "Broadcasted to {} connection(s) in room '{}'",
            delivered,
            room_id
        );
        delivered
    }

    async fn connection_ids(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let Some(channels) = self.channels(room_id).await else {
            return Vec::new();
        };
        let mut ids: Vec<ConnectionId> = channels.connections.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
