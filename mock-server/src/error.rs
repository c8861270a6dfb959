//! Matrix-style error responses: `{"errcode": "M_...", "error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    MissingToken,
    UnknownToken,
    Forbidden(String),
    NotFound(String),
    RoomInUse,
    BadRequest(String),
}

pub type Result<T> = core::result::Result<T, MatrixError>;

impl MatrixError {
    pub fn errcode(&self) -> &'static str {
        match self {
            MatrixError::MissingToken => "M_MISSING_TOKEN",
            MatrixError::UnknownToken => "M_UNKNOWN_TOKEN",
            MatrixError::Forbidden(_) => "M_FORBIDDEN",
            MatrixError::NotFound(_) => "M_NOT_FOUND",
            MatrixError::RoomInUse => "M_ROOM_IN_USE",
            MatrixError::BadRequest(_) => "M_UNKNOWN",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            MatrixError::MissingToken | MatrixError::UnknownToken => StatusCode::UNAUTHORIZED,
            MatrixError::Forbidden(_) => StatusCode::FORBIDDEN,
            MatrixError::NotFound(_) => StatusCode::NOT_FOUND,
            MatrixError::RoomInUse | MatrixError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            MatrixError::MissingToken => "Missing access token".to_string(),
            MatrixError::UnknownToken => "Unrecognised access token".to_string(),
            MatrixError::RoomInUse => "Room alias already taken".to_string(),
            MatrixError::Forbidden(msg) | MatrixError::NotFound(msg) | MatrixError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for MatrixError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "errcode": self.errcode(),
            "error": self.message(),
        }));
        (self.status(), body).into_response()
    }
}
