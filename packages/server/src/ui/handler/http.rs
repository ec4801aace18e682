//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{OpenRoomRequest, OpenRoomResponse, RoomDetailDto, RoomSummaryDto},
    ui::{error::ApiError, state::AppState},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "OK"}))
}

/// Create or look up a room (`POST /api/room/join`)
///
/// 空のボディは Room ID 未指定として扱う。
pub async fn open_room(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<OpenRoomResponse>), ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        OpenRoomRequest::default()
    } else {
        serde_json::from_slice::<OpenRoomRequest>(&body).map_err(|_| ApiError::InvalidBody)?
    };

    let ensured = state.open_room_usecase.execute(request.room_id).await?;
    let status = if ensured.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(OpenRoomResponse {
            room_id: ensured.room.id.to_string(),
            user_count: ensured.room.user_count(),
        }),
    ))
}

/// Get list of rooms
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, ApiError> {
    let rooms = state.room_query_usecase.list().await?;

    // Domain Model から DTO への変換
    Ok(Json(rooms.iter().map(RoomSummaryDto::from).collect()))
}

/// Get room detail by ID
pub async fn room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room = state.room_query_usecase.detail(room_id).await?;
    Ok(Json(RoomDetailDto::from(&room)))
}

/// Unknown paths
pub async fn fallback() -> ApiError {
    ApiError::EndpointNotFound
}
