//! HTTP API のエラーレスポンス

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    infrastructure::dto::http::ErrorResponse,
    usecase::{OpenRoomError, RoomQueryError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid_roomId")]
    InvalidRoomId,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Room not found")]
    RoomNotFound,
    #[error("Endpoint not found")]
    EndpointNotFound,
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRoomId | ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::RoomNotFound | ApiError::EndpointNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("Internal error while handling request: {}", detail);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<OpenRoomError> for ApiError {
    fn from(e: OpenRoomError) -> Self {
        match e {
            OpenRoomError::InvalidRoomId(_) => ApiError::InvalidRoomId,
            OpenRoomError::Repository(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<RoomQueryError> for ApiError {
    fn from(e: RoomQueryError) -> Self {
        match e {
            RoomQueryError::InvalidRoomId(_) => ApiError::InvalidRoomId,
            RoomQueryError::RoomNotFound(_) => ApiError::RoomNotFound,
            RoomQueryError::Repository(e) => ApiError::Internal(e.to_string()),
        }
    }
}
