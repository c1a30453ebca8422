//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, span, caller details)
//!     → handlers.rs (one store call per route)
//!     → response.rs / error.rs (JSON bodies and status codes)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
