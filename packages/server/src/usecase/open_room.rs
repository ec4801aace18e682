//! UseCase: HTTP からの Room 作成（`POST /api/room/join`）
//!
//! WebSocket の参加と同じ `ensure_room` で Room を用意するため、
//! 「Room が存在する」の意味は両経路で一致します。

use std::sync::Arc;

use crate::domain::{EnsuredRoom, RoomId, RoomIdGenerator, RoomRepository};

use super::error::OpenRoomError;

/// 生成した Room ID が既存の Room と衝突したときの生成回数の上限
pub const MAX_GENERATION_ATTEMPTS: usize = 3;

pub struct OpenRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    generator: RoomIdGenerator,
}

impl OpenRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, generator: RoomIdGenerator) -> Self {
        Self {
            repository,
            generator,
        }
    }

    /// Room を用意する
    ///
    /// # Arguments
    ///
    /// * `requested` - クライアントが指定した Room ID。無い（または空白のみの）場合は生成する
    pub async fn execute(&self, requested: Option<String>) -> Result<EnsuredRoom, OpenRoomError> {
        let room_id = match requested.filter(|id| !id.trim().is_empty()) {
            Some(id) => RoomId::new(id)?,
            None => self.fresh_room_id().await?,
        };

        let ensured = self.repository.ensure_room(&room_id).await?;
        if ensured.created {
            tracing::info!("Room '{}' opened over HTTP", room_id);
        }
        Ok(ensured)
    }

    /// 既存の Room と衝突しない ID を生成する（最後の候補は衝突しても使う）
    async fn fresh_room_id(&self) -> Result<RoomId, OpenRoomError> {
        let mut candidate = self.generator.generate()?;
        for _ in 1..MAX_GENERATION_ATTEMPTS {
            if self.repository.get_room(&candidate).await?.is_none() {
                break;
            }
            tracing::debug!("Generated room id '{}' already exists, retrying", candidate);
            candidate = self.generator.generate()?;
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, Room, Timestamp, ValueObjectError},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use rakugaki_shared::time::FixedClock;

    fn create_test_usecase() -> (OpenRoomUseCase, Arc<InMemoryRoomRepository>) {
        let repository = Arc::new(InMemoryRoomRepository::new(Arc::new(FixedClock::new(1))));
        let usecase = OpenRoomUseCase::new(repository.clone(), RoomIdGenerator::new());
        (usecase, repository)
    }

    #[tokio::test]
    async fn test_open_requested_room() {
        // テスト項目: 指定した Room ID で作成され、2 回目は既存扱いになる
        // given (前提条件):
        let (usecase, _repository) = create_test_usecase();

        // when (操作):
        let first = usecase.execute(Some("Ab3dE9".to_string())).await.unwrap();
        let second = usecase.execute(Some("Ab3dE9".to_string())).await.unwrap();

        // then (期待する結果):
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.room.id.as_str(), "Ab3dE9");
        assert_eq!(second.room.user_count(), 0);
    }

    #[tokio::test]
    async fn test_open_generates_room_id_when_absent() {
        // テスト項目: Room ID が無い・空白のみの場合は 6 文字の ID が生成される
        // given (前提条件):
        let (usecase, repository) = create_test_usecase();

        // when (操作):
        let generated = usecase.execute(None).await.unwrap();
        let blank = usecase.execute(Some("  ".to_string())).await.unwrap();

        // then (期待する結果):
        assert!(generated.created);
        assert!(blank.created);
        assert_eq!(generated.room.id.as_str().len(), 6);
        assert_eq!(repository.list_rooms().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_room_id() {
        // テスト項目: 不正な Room ID は Room を作らずに拒否される
        // given (前提条件):
        let (usecase, repository) = create_test_usecase();

        // when (操作):
        let result = usecase.execute(Some("ab!123".to_string())).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(OpenRoomError::InvalidRoomId(ValueObjectError::InvalidRoomId(
                "ab!123".to_string()
            )))
        );
        assert!(repository.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_regenerates_on_collision() {
        // テスト項目: 生成した ID が既存の Room と衝突したら生成し直す
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        let mut lookups = 0;
        repository.expect_get_room().times(2).returning(move |id| {
            lookups += 1;
            if lookups == 1 {
                Ok(Some(Room::new(id.clone(), Timestamp::new(0))))
            } else {
                Ok(None)
            }
        });
        repository.expect_ensure_room().times(1).returning(|id| {
            Ok(EnsuredRoom {
                room: Room::new(id.clone(), Timestamp::new(1)),
                created: true,
            })
        });
        let usecase = OpenRoomUseCase::new(Arc::new(repository), RoomIdGenerator::new());

        // when (操作):
        let result = usecase.execute(None).await;

        // then (期待する結果):
        assert!(result.unwrap().created);
    }

    #[tokio::test]
    async fn test_open_gives_up_after_max_attempts() {
        // テスト項目: 衝突が続いても上限回数で打ち切り、最後の候補を使う
        // given (前提条件):
        let mut repository = MockRoomRepository::new();
        repository
            .expect_get_room()
            .times(MAX_GENERATION_ATTEMPTS - 1)
            .returning(|id| Ok(Some(Room::new(id.clone(), Timestamp::new(0)))));
        repository.expect_ensure_room().times(1).returning(|id| {
            Ok(EnsuredRoom {
                room: Room::new(id.clone(), Timestamp::new(0)),
                created: false,
            })
        });
        let usecase = OpenRoomUseCase::new(Arc::new(repository), RoomIdGenerator::new());

        // when (操作):
        let result = usecase.execute(None).await;

        // then (期待する結果):
        assert!(!result.unwrap().created);
    }
}
