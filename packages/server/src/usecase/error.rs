//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// 参加処理のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JoinRoomError {
    #[error("room store failure: {0}")]
    Repository(#[from] RepositoryError),
}

/// HTTP からの Room 作成・参照のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpenRoomError {
    #[error(transparent)]
    InvalidRoomId(#[from] ValueObjectError),
    #[error("room store failure: {0}")]
    Repository(#[from] RepositoryError),
}

/// Room 照会のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomQueryError {
    #[error(transparent)]
    InvalidRoomId(#[from] ValueObjectError),
    #[error("room '{0}' not found")]
    RoomNotFound(String),
    #[error("room store failure: {0}")]
    Repository(#[from] RepositoryError),
}
