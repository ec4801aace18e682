//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロック戦略
//!
//! Room ごとに `Mutex` を持たせ（sharded mutex）、外側の `RwLock` は
//! Room の検索・登録にだけ使います。外側のロックを保持したまま Room の
//! ロックを待つことはないため、別の Room への操作が互いをブロックしません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use rakugaki_shared::time::Clock;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ConnectionId, DrawingCommand, EnsuredRoom, MemberAdmission, RepositoryError, Room, RoomId,
    RoomRepository, Timestamp,
};

type RoomHandle = Arc<Mutex<Room>>;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// Room ID → Room
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    /// タイムスタンプの取得元
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    async fn handle(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// 既存の Room を返すか、無ければ登録する
    ///
    /// 登録は書き込みロック下で `entry` を使うので、競合しても 1 つに収束する。
    async fn handle_or_insert(&self, room_id: &RoomId) -> (RoomHandle, bool) {
        if let Some(handle) = self.handle(room_id).await {
            return (handle, false);
        }

        let mut rooms = self.rooms.write().await;
        let mut created = false;
        let handle = rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(Room::new(room_id.clone(), self.now())))
            })
            .clone();
        (handle, created)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn ensure_room(&self, room_id: &RoomId) -> Result<EnsuredRoom, RepositoryError> {
        let (handle, created) = self.handle_or_insert(room_id).await;

        let mut room = handle.lock().await;
        room.touch(self.now());

        if created {
            tracing::debug!("Room '{}' created", room_id);
        }

        Ok(EnsuredRoom {
            room: room.clone(),
            created,
        })
    }

    async fn ensure_room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        let (handle, created) = self.handle_or_insert(room_id).await;
        handle.lock().await.touch(self.now());

        if created {
            tracing::debug!("Room '{}' created", room_id);
        }
        Ok(created)
    }

    async fn add_member_if_absent(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<MemberAdmission, RepositoryError> {
        let handle = self
            .handle(room_id)
            .await
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;

        let mut room = handle.lock().await;
        let newly_added = room.add_member_if_absent(connection_id.clone(), self.now());

        Ok(MemberAdmission {
            room: room.clone(),
            newly_added,
        })
    }

    async fn remove_member(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Option<Room>, RepositoryError> {
        let Some(handle) = self.handle(room_id).await else {
            return Ok(None);
        };

        let mut room = handle.lock().await;
        room.remove_member(connection_id, self.now());
        Ok(Some(room.clone()))
    }

    async fn append_drawing_command(
        &self,
        room_id: &RoomId,
        command: DrawingCommand,
    ) -> Result<(), RepositoryError> {
        let handle = self
            .handle(room_id)
            .await
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;

        let mut room = handle.lock().await;
        room.append(command, self.now());
        Ok(())
    }

    async fn update_cursor(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
    ) -> Result<(), RepositoryError> {
        if let Some(handle) = self.handle(room_id).await {
            let mut room = handle.lock().await;
            room.update_cursor(connection_id, x, y, self.now());
        }
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let Some(handle) = self.handle(room_id).await else {
            return Ok(None);
        };
        let room = handle.lock().await;
        Ok(Some(room.clone()))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        // 外側のロックは Room ごとのロックを待つ前に解放する
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();

        let mut rooms = Vec::with_capacity(handles.len());
        for handle in handles {
            rooms.push(handle.lock().await.clone());
        }
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rooms)
    }
}
