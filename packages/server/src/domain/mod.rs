//! ドメイン層
//!
//! Room の状態と不変条件、および外部とのポート（Repository / Registry）を定義します。

pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{
    Cursor, DrawingAction, DrawingCommand, DrawingKind, Member, Room, Stroke, replay,
};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::RoomIdGenerator;
pub use registry::{PusherChannel, RoomRegistry};
pub use repository::{EnsuredRoom, MemberAdmission, RoomRepository};
pub use value_object::{ConnectionId, Point, RoomId, Timestamp};

#[cfg(test)]
pub use repository::MockRoomRepository;
