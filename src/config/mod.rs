//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (loader.rs)
//!     → environment variables (loader.rs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! All fields have defaults, so the service starts with no file and no
//! environment at all.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::DatabaseConfig;
pub use schema::ListenerConfig;
pub use schema::{LogFormat, ObservabilityConfig, StoreBackend};
