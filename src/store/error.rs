use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => {
                StoreError::Connection(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
