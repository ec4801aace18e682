//! UseCase 層
//!
//! 1 操作につき 1 ユースケース。Domain の trait（RoomRepository, RoomRegistry）
//! にだけ依存し、ワイヤーフォーマットは知りません（配信するメッセージは
//! UI 層が組み立てて渡します）。

pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod move_cursor;
pub mod open_room;
pub mod relay_drawing;
pub mod room_query;

pub use error::{JoinRoomError, OpenRoomError, RoomQueryError};
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use move_cursor::MoveCursorUseCase;
pub use open_room::{MAX_GENERATION_ATTEMPTS, OpenRoomUseCase};
pub use relay_drawing::RelayDrawingUseCase;
pub use room_query::RoomQueryUseCase;
