//! Room Registry trait 定義
//!
//! Room ID から、現在接続中のコネクションへの送信チャンネルを引くための
//! インメモリの配信テーブルです。メンバーシップの正は Room Store であり、
//! Registry は「誰に送るか」だけを知っています。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, RoomId};

/// 接続ごとの送信チャンネル（JSON テキストを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 接続を Room の配信対象に登録する（同じ接続の再登録はチャンネルを置き換える）
    async fn register(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        channel: PusherChannel,
    );

    /// 接続を配信対象から外す
    ///
    /// # Returns
    ///
    /// 登録されていた場合は `true`
    async fn unregister(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool;

    /// 送信者以外の、同じ Room に登録された全接続へ送る
    ///
    /// 一部の送信失敗は許容し、ログに残すだけにする。
    ///
    /// # Returns
    ///
    /// 送信に成功した接続数
    async fn broadcast_except(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        content: &str,
    ) -> usize;

    /// Room に登録されている接続 ID の一覧
    async fn connection_ids(&self, room_id: &RoomId) -> Vec<ConnectionId>;
}
