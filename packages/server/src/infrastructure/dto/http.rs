//! HTTP API DTOs

use serde::{Deserialize, Serialize};

use crate::domain::Cursor;

/// `POST /api/room/join` のリクエスト
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRoomRequest {
    #[serde(default)]
    pub room_id: Option<String>,
}

/// `POST /api/room/join` のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRoomResponse {
    pub room_id: String,
    pub user_count: usize,
}

/// `GET /api/rooms` の要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub user_count: usize,
    pub command_count: usize,
    pub created_at: String,
    pub last_activity: String,
}

/// `GET /api/rooms/{room_id}` のメンバー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailDto {
    pub user_id: String,
    pub joined_at: String,
    pub cursor: Cursor,
}

/// `GET /api/rooms/{room_id}` のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub room_id: String,
    pub user_count: usize,
    pub members: Vec<MemberDetailDto>,
    pub command_count: usize,
    pub visible_stroke_count: usize,
    pub created_at: String,
    pub last_activity: String,
}

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
