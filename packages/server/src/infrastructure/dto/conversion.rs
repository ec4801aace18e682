//! Conversion logic between DTOs and domain entities.

use thiserror::Error;

use crate::domain::{
    ConnectionId, DrawingAction, DrawingCommand, Room, Stroke, Timestamp, ValueObjectError,
};
use crate::infrastructure::dto::{
    http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    record::{DrawingCommandRecord, DrawingDataRecord, DrawingKind},
};
use rakugaki_shared::time::timestamp_to_rfc3339;

/// レコードからドメインへの変換エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordConversionError {
    #[error("stroke record is missing field '{0}'")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),
}

// ========================================
// Record → Domain Entity
// ========================================

impl TryFrom<DrawingCommandRecord> for DrawingCommand {
    type Error = RecordConversionError;

    fn try_from(record: DrawingCommandRecord) -> Result<Self, Self::Error> {
        let author = ConnectionId::new(record.user_id)?;
        let timestamp = Timestamp::new(record.data.timestamp);

        match record.kind {
            DrawingKind::Stroke => {
                let data = record.data;
                let stroke = Stroke {
                    points: data
                        .points
                        .ok_or(RecordConversionError::MissingField("points"))?,
                    color: data
                        .color
                        .ok_or(RecordConversionError::MissingField("color"))?,
                    width: data
                        .width
                        .ok_or(RecordConversionError::MissingField("width"))?,
                };
                Ok(DrawingCommand::stroke(author, stroke, timestamp))
            }
            DrawingKind::Clear => Ok(DrawingCommand::clear(author, timestamp)),
        }
    }
}

// ========================================
// Domain Entity → Record / DTO
// ========================================

impl From<&DrawingCommand> for DrawingCommandRecord {
    fn from(command: &DrawingCommand) -> Self {
        let timestamp = command.timestamp.value();
        let data = match &command.action {
            DrawingAction::Stroke(stroke) => DrawingDataRecord {
                color: Some(stroke.color.clone()),
                width: Some(stroke.width),
                points: Some(stroke.points.clone()),
                timestamp,
            },
            DrawingAction::Clear => DrawingDataRecord {
                color: None,
                width: None,
                points: None,
                timestamp,
            },
        };

        Self {
            kind: command.kind(),
            data,
            user_id: command.author.as_str().to_string(),
        }
    }
}

/// 参加時に返す履歴（追記順）
pub fn history_records(room: &Room) -> Vec<DrawingCommandRecord> {
    room.drawing_log.iter().map(DrawingCommandRecord::from).collect()
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.as_str().to_string(),
            user_count: room.user_count(),
            command_count: room.drawing_log.len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            last_activity: timestamp_to_rfc3339(room.last_activity.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.as_str().to_string(),
            user_count: room.user_count(),
            members: room
                .members
                .iter()
                .map(|m| MemberDetailDto {
                    user_id: m.connection_id.as_str().to_string(),
                    joined_at: timestamp_to_rfc3339(m.joined_at.value()),
                    cursor: m.cursor,
                })
                .collect(),
            command_count: room.drawing_log.len(),
            visible_stroke_count: room.visible_strokes().len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            last_activity: timestamp_to_rfc3339(room.last_activity.value()),
        }
    }
}
