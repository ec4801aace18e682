//! WebSocket message DTOs.
//!
//! Every frame is a JSON text message discriminated by `type`. Field names are
//! camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Point;

use super::record::DrawingCommandRecord;

/// Events sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    #[serde(alias = "join-room")]
    Join {
        #[serde(default, deserialize_with = "lenient_room_id")]
        room_id: String,
    },
    DrawStart {
        room_id: String,
        point: Point,
        color: String,
        width: f64,
    },
    DrawMove { room_id: String, point: Point },
    DrawEnd {
        room_id: String,
        points: Vec<Point>,
        color: String,
        width: f64,
    },
    ClearCanvas { room_id: String },
    CursorMove { room_id: String, x: f64, y: f64 },
}

impl ClientEvent {
    /// Wire name of the event, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::DrawStart { .. } => "draw-start",
            ClientEvent::DrawMove { .. } => "draw-move",
            ClientEvent::DrawEnd { .. } => "draw-end",
            ClientEvent::ClearCanvas { .. } => "clear-canvas",
            ClientEvent::CursorMove { .. } => "cursor-move",
        }
    }

    /// Room the event is addressed to.
    pub fn room_id(&self) -> &str {
        match self {
            ClientEvent::Join { room_id }
            | ClientEvent::DrawStart { room_id, .. }
            | ClientEvent::DrawMove { room_id, .. }
            | ClientEvent::DrawEnd { room_id, .. }
            | ClientEvent::ClearCanvas { room_id }
            | ClientEvent::CursorMove { room_id, .. } => room_id,
        }
    }
}

/// Accepts any JSON value as a join target so that a bad room id is answered
/// with an `invalid_roomId` acknowledgement instead of a parse failure.
/// Strings pass through, numbers keep their decimal form, anything else is empty.
fn lenient_room_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => value,
        serde_json::Value::Number(value) => value.to_string(),
        _ => String::new(),
    })
}

/// A client frame: an event plus an optional acknowledgement request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    #[serde(default)]
    pub ack_id: Option<u64>,
    #[serde(flatten)]
    pub event: ClientEvent,
}

/// Error codes reported to the originating connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "invalid_roomId")]
    InvalidRoomId,
    #[serde(rename = "already_joined")]
    AlreadyJoined,
    #[serde(rename = "not_joined")]
    NotJoined,
    #[serde(rename = "malformed_event")]
    MalformedEvent,
    #[serde(rename = "server_error")]
    ServerError,
}

/// Acknowledgement of a `join`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinAck {
    pub ack_id: u64,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<DrawingCommandRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl JoinAck {
    pub fn accepted(
        ack_id: u64,
        room_id: String,
        history: Vec<DrawingCommandRecord>,
        user_count: usize,
        user_id: String,
    ) -> Self {
        Self {
            ack_id,
            ok: true,
            room_id: Some(room_id),
            history: Some(history),
            user_count: Some(user_count),
            user_id: Some(user_id),
            error: None,
        }
    }

    pub fn rejected(ack_id: u64, error: ErrorCode) -> Self {
        Self {
            ack_id,
            ok: false,
            room_id: None,
            history: None,
            user_count: None,
            user_id: None,
            error: Some(error),
        }
    }
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Ack(JoinAck),
    UserJoined {
        user_id: String,
        user_count: usize,
    },
    UserLeft {
        user_id: String,
        user_count: usize,
    },
    DrawStart {
        user_id: String,
        point: Point,
        color: String,
        width: f64,
    },
    DrawMove {
        user_id: String,
        point: Point,
    },
    DrawEnd {
        user_id: String,
        points: Vec<Point>,
        color: String,
        width: f64,
    },
    ClearCanvas {
        user_id: String,
    },
    CursorMove {
        user_id: String,
        x: f64,
        y: f64,
    },
    Error {
        error: ErrorCode,
    },
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
