//! Shared application state.

use std::sync::Arc;

use rakugaki_shared::time::Clock;

use crate::{
    domain::{RoomIdGenerator, RoomRegistry, RoomRepository},
    usecase::{
        JoinRoomUseCase, LeaveRoomUseCase, MoveCursorUseCase, OpenRoomUseCase,
        RelayDrawingUseCase, RoomQueryUseCase,
    },
};

/// Shared application state
///
/// プロセス起動時に 1 度だけ組み立て、全ての接続ハンドラに渡します。
pub struct AppState {
    /// JoinRoomUseCase（Room 参加）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// RelayDrawingUseCase（描画の永続化と中継）
    pub relay_drawing_usecase: Arc<RelayDrawingUseCase>,
    /// MoveCursorUseCase（カーソル移動）
    pub move_cursor_usecase: Arc<MoveCursorUseCase>,
    /// LeaveRoomUseCase（切断時の退出）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// OpenRoomUseCase（HTTP からの Room 作成）
    pub open_room_usecase: Arc<OpenRoomUseCase>,
    /// RoomQueryUseCase（Room 一覧・詳細）
    pub room_query_usecase: Arc<RoomQueryUseCase>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn RoomRegistry>,
        generator: RoomIdGenerator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                registry.clone(),
            )),
            relay_drawing_usecase: Arc::new(RelayDrawingUseCase::new(
                repository.clone(),
                registry.clone(),
                clock,
            )),
            move_cursor_usecase: Arc::new(MoveCursorUseCase::new(
                repository.clone(),
                registry.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(repository.clone(), registry)),
            open_room_usecase: Arc::new(OpenRoomUseCase::new(repository.clone(), generator)),
            room_query_usecase: Arc::new(RoomQueryUseCase::new(repository)),
        }
    }
}
