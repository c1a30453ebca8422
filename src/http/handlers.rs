//! Route handlers.
//!
//! Each handler makes its own store calls; a failure becomes a JSON error
//! response at this boundary. The home route is the exception: a failed
//! visit write is logged and the welcome payload is returned anyway.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::request::user_agent;
use crate::http::response::{
    now, ErrorBody, HealthResponse, StatsResponse, UsersResponse, WelcomeResponse,
};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::{NewUser, NewVisit, User};

/// `POST /api/users` body. Both fields are optional here so a missing field
/// is reported as 400 rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateUserRequest {
    /// Both fields, if present and non-empty.
    fn into_new_user(self) -> Option<NewUser> {
        match (self.username, self.email) {
            (Some(username), Some(email)) if !username.is_empty() && !email.is_empty() => {
                Some(NewUser { username, email })
            }
            _ => None,
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy())),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unhealthy(e.to_string())),
            )
        }
    }
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<WelcomeResponse> {
    let visit = NewVisit {
        ip_address: addr.ip().to_string(),
        user_agent: user_agent(&headers),
    };

    let logged = match state.store.record_visit(&visit).await {
        Ok(()) => {
            metrics::visit_recorded();
            true
        }
        Err(e) => {
            tracing::error!(error = %e, ip = %visit.ip_address, "Error in index");
            metrics::visit_failed();
            false
        }
    };

    Json(WelcomeResponse::new(logged))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.store.list_users().await.map_err(|e| {
        tracing::error!(error = %e, "Error getting users");
        ApiError::from(e)
    })?;

    let count = users.len();
    Ok(Json(UsersResponse { users, count }))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let request: CreateUserRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let new_user = request
        .into_new_user()
        .ok_or_else(|| ApiError::BadRequest("Username and email are required".into()))?;

    let user = state.store.create_user(&new_user).await.map_err(|e| {
        let err = ApiError::from(e);
        if matches!(err, ApiError::Conflict) {
            tracing::info!(username = %new_user.username, "User already exists");
        } else {
            tracing::error!(error = %err, "Error creating user");
        }
        err
    })?;

    metrics::user_created();
    tracing::info!(id = user.id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.stats().await.map_err(|e| {
        tracing::error!(error = %e, "Error getting stats");
        ApiError::from(e)
    })?;

    Ok(Json(StatsResponse {
        users: stats.users,
        visits: stats.visits,
        timestamp: now(),
    }))
}

/// Any unmatched path.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".into(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<NewUser> {
        serde_json::from_str::<CreateUserRequest>(json)
            .unwrap()
            .into_new_user()
    }

    #[test]
    fn both_fields_required() {
        assert!(parse(r#"{"username":"ada","email":"ada@example.com"}"#).is_some());
        assert!(parse(r#"{"username":"ada"}"#).is_none());
        assert!(parse(r#"{"email":"ada@example.com"}"#).is_none());
        assert!(parse(r#"{"username":null,"email":"ada@example.com"}"#).is_none());
        assert!(parse("{}").is_none());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        assert!(parse(r#"{"username":"","email":"ada@example.com"}"#).is_none());
        assert!(parse(r#"{"username":"ada","email":""}"#).is_none());
    }
}
