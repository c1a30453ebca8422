//! Handler error type and its JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::response::ErrorBody;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("User already exists")]
    Conflict,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status() {
        let conflict: ApiError = StoreError::Conflict("users_email_key".into()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.to_string(), "User already exists");

        let query: ApiError = StoreError::Query("relation does not exist".into()).into();
        assert_eq!(query.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(query.to_string(), "Query error: relation does not exist");

        let down: ApiError = StoreError::Connection("refused".into()).into();
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
