//! Row types for the `users` and `visits` tables.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Filled in by the store; `None` only if the column default was bypassed.
    pub created_at: Option<NaiveDateTime>,
}

/// Fields supplied by the caller when registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

/// One logged request to the home route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub id: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub visited_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub ip_address: String,
    /// Empty when the client sent no `User-Agent`.
    pub user_agent: String,
}

/// Row counts of both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub users: i64,
    pub visits: i64,
}
