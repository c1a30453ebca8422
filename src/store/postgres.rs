//! PostgreSQL-backed store.
//!
//! Every operation opens its own connection and closes it before returning;
//! nothing is pooled or shared between requests.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, error, warn};

use crate::config::DatabaseConfig;
use crate::store::models::{NewUser, NewVisit, Stats, User};
use crate::store::{Result, Store, StoreError};

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(100) UNIQUE NOT NULL,
        email VARCHAR(255) UNIQUE NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_VISITS: &str = r#"
    CREATE TABLE IF NOT EXISTS visits (
        id SERIAL PRIMARY KEY,
        ip_address VARCHAR(45),
        user_agent TEXT,
        visited_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

pub struct PgStore {
    options: PgConnectOptions,
}

impl PgStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        Self { options }
    }

    async fn connect(&self) -> Result<PgConnection> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| {
                error!(error = %e, "Database connection error");
                StoreError::Connection(e.to_string())
            })
    }
}

/// Close a per-call connection. A failed close does not fail the call that
/// already produced its result.
async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close database connection cleanly");
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.connect().await?;
        close(conn).await;
        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        let mut conn = self.connect().await?;

        let result = async {
            sqlx::query(CREATE_USERS).execute(&mut conn).await?;
            sqlx::query(CREATE_VISITS).execute(&mut conn).await?;
            Ok::<_, sqlx::Error>(())
        }
        .await;

        close(conn).await;
        result?;
        debug!("users and visits tables present");
        Ok(())
    }

    async fn record_visit(&self, visit: &NewVisit) -> Result<()> {
        let mut conn = self.connect().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO visits (ip_address, user_agent)
            VALUES ($1, $2)
            "#,
        )
        .bind(&visit.ip_address)
        .bind(&visit.user_agent)
        .execute(&mut conn)
        .await;

        close(conn).await;
        result?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut conn = self.connect().await?;

        let result = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&mut conn)
        .await;

        close(conn).await;
        Ok(result?)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut conn = self.connect().await?;

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .fetch_one(&mut conn)
        .await;

        close(conn).await;
        Ok(result?)
    }

    async fn stats(&self) -> Result<Stats> {
        let mut conn = self.connect().await?;

        let result = async {
            let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
                .fetch_one(&mut conn)
                .await?;
            let (visits,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
                .fetch_one(&mut conn)
                .await?;
            Ok::<_, sqlx::Error>(Stats { users, visits })
        }
        .await;

        close(conn).await;
        Ok(result?)
    }
}
