//! UseCase: 切断による退出
//!
//! 1. Registry から外す（以降この接続には配信しない）
//! 2. Room Store からメンバーを削除
//! 3. 残りの接続へ `user-left` を通知（UI 層が組み立てたメッセージ）

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRegistry, RoomRepository};

pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn RoomRegistry>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, registry: Arc<dyn RoomRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// 退出後の参加者数。Room Store の削除に失敗した場合は、
    /// Registry に残っている接続数で代用する。
    pub async fn execute(&self, room_id: &RoomId, connection_id: &ConnectionId) -> usize {
        self.registry.unregister(room_id, connection_id).await;

        match self.repository.remove_member(room_id, connection_id).await {
            Ok(Some(room)) => room.user_count(),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(
                    "Failed to remove member '{}' from room '{}': {}",
                    connection_id,
                    room_id,
                    e
                );
                self.registry.connection_ids(room_id).await.len()
            }
        }
    }

    /// 残りの接続へ退出を通知
    pub async fn broadcast_participant_left(
        &self,
        room_id: &RoomId,
        left_connection_id: &ConnectionId,
        message: &str,
    ) -> usize {
        self.registry
            .broadcast_except(room_id, left_connection_id, message)
            .await
    }
}
