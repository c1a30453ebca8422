//! JSON response bodies.
//!
//! Timestamps serialize as naive ISO-8601 UTC (`2026-01-01T12:00:00.123456`).

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::User;

pub const WELCOME_MESSAGE: &str = "Welcome to Multi-Tier AWS Application";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LOGGING_UNAVAILABLE: &str = "Database logging temporarily unavailable";

/// Current UTC time without an offset.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".into(),
            timestamp: now(),
            database: "connected".into(),
            error: None,
        }
    }

    pub fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy".into(),
            timestamp: now(),
            database: "disconnected".into(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub version: String,
    pub timestamp: NaiveDateTime,
    pub status: String,
    /// Present only when the visit could not be logged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl WelcomeResponse {
    pub fn new(visit_logged: bool) -> Self {
        Self {
            message: WELCOME_MESSAGE.into(),
            version: VERSION.into(),
            timestamp: now(),
            status: "operational".into(),
            note: (!visit_logged).then(|| LOGGING_UNAVAILABLE.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub users: i64,
    pub visits: i64,
    pub timestamp: NaiveDateTime,
}
