//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Room ID の形式が不正
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),

    /// 接続 ID が空
    #[error("connection id must not be empty")]
    EmptyConnectionId,
}

/// Room Store（Repository）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// 対象の Room が存在しない
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// ストレージへの読み書きに失敗
    #[error("storage error: {0}")]
    Storage(String),

    /// 永続化されたレコードを復元できない
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}
