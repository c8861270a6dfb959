use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use crate::error::{MatrixError, Result};
use crate::Db;

/// The session behind a request's `Authorization: Bearer` header.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: String,
    pub device_id: String,
    pub access_token: String,
}

impl FromRequestParts<Db> for Session {
    type Rejection = MatrixError;

    async fn from_request_parts(parts: &mut Parts, state: &Db) -> Result<Self> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(MatrixError::MissingToken)?;

        state
            .read()
            .await
            .session(token)
            .cloned()
            .ok_or(MatrixError::UnknownToken)
    }
}
