//! In-process store for local development and tests.
//!
//! Mirrors the PostgreSQL schema rules: `username` and `email` are unique,
//! ids are assigned sequentially, timestamps default to the insert time, and
//! users list newest first. It can be switched to "unavailable", after which
//! every call fails the way an unreachable database would.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use parking_lot::Mutex;

use crate::store::models::{NewUser, NewVisit, Stats, User, Visit};
use crate::store::{Result, Store, StoreError};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    visits: Vec<Visit>,
    next_user_id: i32,
    next_visit_id: i32,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the database going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of all logged visits, oldest first.
    pub fn visits(&self) -> Vec<Visit> {
        self.tables.lock().visits.clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection(
                "connection refused: store is unavailable".to_string(),
            ))
        }
    }
}

/// `ORDER BY created_at DESC` as PostgreSQL evaluates it: NULL sorts as the
/// greatest value, so it comes first.
pub fn newest_first(a: &Option<NaiveDateTime>, b: &Option<NaiveDateTime>) -> CmpOrdering {
    match (a, b) {
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => CmpOrdering::Less,
        (Some(_), None) => CmpOrdering::Greater,
        (Some(a), Some(b)) => b.cmp(a),
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }

    async fn init_schema(&self) -> Result<()> {
        self.check_available()
    }

    async fn record_visit(&self, visit: &NewVisit) -> Result<()> {
        self.check_available()?;

        let mut tables = self.tables.lock();
        tables.next_visit_id += 1;
        let id = tables.next_visit_id;
        tables.visits.push(Visit {
            id,
            ip_address: Some(visit.ip_address.clone()),
            user_agent: Some(visit.user_agent.clone()),
            visited_at: Some(Utc::now().naive_utc()),
        });
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check_available()?;

        let mut users = self.tables.lock().users.clone();
        users.sort_by(|a, b| newest_first(&a.created_at, &b.created_at));
        Ok(users)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.check_available()?;

        let mut tables = self.tables.lock();
        if let Some(existing) = tables
            .users
            .iter()
            .find(|u| u.username == user.username || u.email == user.email)
        {
            let column = if existing.username == user.username {
                "username"
            } else {
                "email"
            };
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint \"users_{}_key\"",
                column
            )));
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: Some(Utc::now().naive_utc()),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn stats(&self) -> Result<Stats> {
        self.check_available()?;

        let tables = self.tables.lock();
        Ok(Stats {
            users: tables.users.len() as i64,
            visits: tables.visits.len() as i64,
        })
    }
}
