//! visit-tracker
//!
//! A small JSON service in front of PostgreSQL, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request ID, trace, body limit, CORS)
//!                         │
//!                         ▼
//!                     http::handlers ──▶ store::Store ──▶ PostgreSQL
//!                         │               (one connection per call)
//!                         ▼
//!     ◀────────────── JSON response
//! ```
//!
//! # Routes
//! - `GET /health`: store connectivity
//! - `GET /`: welcome payload, logs the visit
//! - `GET /api/users`, `POST /api/users`: list and register users
//! - `GET /api/stats`: user and visit counts

use std::path::PathBuf;

use clap::Parser;

use visit_tracker::lifecycle::startup;

#[derive(Parser)]
#[command(name = "visit-tracker", version, about)]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "APP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = startup::run(args.config.as_deref()).await {
        // The subscriber may not be installed yet if config loading failed.
        eprintln!("visit-tracker: {}", e);
        tracing::error!(error = %e, "Fatal startup error");
        std::process::exit(1);
    }
}
