//! UseCase: Room の照会（HTTP の一覧・詳細）

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::RoomQueryError;

pub struct RoomQueryUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl RoomQueryUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 全 Room のスナップショット（Room ID 順）
    pub async fn list(&self) -> Result<Vec<Room>, RoomQueryError> {
        Ok(self.repository.list_rooms().await?)
    }

    /// Room ID を検証して 1 件取得
    pub async fn detail(&self, room_id: String) -> Result<Room, RoomQueryError> {
        let room_id = RoomId::new(room_id)?;
        self.repository
            .get_room(&room_id)
            .await?
            .ok_or_else(|| RoomQueryError::RoomNotFound(room_id.into_string()))
    }
}
