//! Repository trait 定義（Room Store）
//!
//! ドメイン層が必要とする永続化のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 並行性の約束
//!
//! - 同じ `RoomId` に対する変更操作は、その Room について直列化されたように見えること
//! - 異なる `RoomId` に対する操作は互いをブロックしないこと

use async_trait::async_trait;

use super::{ConnectionId, DrawingCommand, RepositoryError, Room, RoomId};

/// `ensure_room` の結果
#[derive(Debug, Clone, PartialEq)]
pub struct EnsuredRoom {
    /// 操作後の Room スナップショット
    pub room: Room,
    /// この呼び出しで Room を作成したかどうか
    pub created: bool,
}

/// `add_member_if_absent` の結果
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAdmission {
    /// 追加直後（または未変更）の Room スナップショット
    pub room: Room,
    /// この呼び出しでメンバーを追加したかどうか
    pub newly_added: bool,
}

/// Room Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room が無ければ作成し、あれば返す。常に `last_activity` を更新する
    ///
    /// 未知の `room_id` に対して同時に呼ばれても作成は 1 回だけ行われる。
    async fn ensure_room(&self, room_id: &RoomId) -> Result<EnsuredRoom, RepositoryError>;

    /// `ensure_room` と同じ作成・更新を行うが、スナップショットは作らない
    ///
    /// 作成したかどうかだけを返す。直後に別の操作で Room を読む呼び出し元向け。
    async fn ensure_room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError>;

    /// 同じ接続のメンバーが居ない場合のみ追加する
    ///
    /// Room が存在しない場合は `RepositoryError::RoomNotFound`。
    async fn add_member_if_absent(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<MemberAdmission, RepositoryError>;

    /// メンバーを削除し、削除後の Room を返す（Room が無ければ `None`）
    async fn remove_member(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Option<Room>, RepositoryError>;

    /// 描画履歴に追記し、`last_activity` を更新する
    async fn append_drawing_command(
        &self,
        room_id: &RoomId,
        command: DrawingCommand,
    ) -> Result<(), RepositoryError>;

    /// メンバーのカーソルを `{x, y, visible: true}` に更新する
    ///
    /// Room やメンバーが存在しない場合は何もしない（エラーにしない）。
    async fn update_cursor(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
    ) -> Result<(), RepositoryError>;

    /// Room のスナップショットを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError>;

    /// 全 Room のスナップショットを取得（Room ID 順）
    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError>;
}
