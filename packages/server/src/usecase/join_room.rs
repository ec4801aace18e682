//! UseCase: Room への参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() の順序（ensure → add member → register）
//! - 参加通知のブロードキャスト先
//!
//! ### なぜこのテストが必要か
//! - 参加者に返す履歴は、自分のメンバー登録以降のスナップショットでなければならない
//! - 同じ接続の再参加でメンバーが重複してはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：未知の Room への初回参加、既存 Room への参加
//! - 冪等性：同じ接続の再参加
//! - 異常系：Room Store の障害

use std::sync::Arc;

use crate::domain::{ConnectionId, PusherChannel, Room, RoomId, RoomRegistry, RoomRepository};

use super::error::JoinRoomError;

/// 参加処理の結果
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// メンバー追加直後の Room スナップショット（ack に使う）
    pub room: Room,
    /// この参加でメンバーが新しく追加されたか
    pub newly_added: bool,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn RoomRegistry>,
}

impl JoinRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, registry: Arc<dyn RoomRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// 参加を実行
    ///
    /// 1. `ensure_room_exists` で Room の存在を保証（スナップショットは作らない）
    /// 2. `add_member_if_absent` でメンバー登録し、その時点のスナップショットを得る
    /// 3. Registry に配信先として登録
    ///
    /// 参加通知は 3 の後に `broadcast_participant_joined` で行うこと。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        channel: PusherChannel,
    ) -> Result<JoinOutcome, JoinRoomError> {
        self.repository.ensure_room_exists(room_id).await?;

        let admission = self
            .repository
            .add_member_if_absent(room_id, connection_id)
            .await?;

        self.registry
            .register(room_id, connection_id, channel)
            .await;

        Ok(JoinOutcome {
            room: admission.room,
            newly_added: admission.newly_added,
        })
    }

    /// 参加者以外の接続へ参加を通知
    ///
    /// # Returns
    ///
    /// 通知できた接続数
    pub async fn broadcast_participant_joined(
        &self,
        room_id: &RoomId,
        new_connection_id: &ConnectionId,
        message: &str,
    ) -> usize {
        self.registry
            .broadcast_except(room_id, new_connection_id, message)
            .await
    }
}
