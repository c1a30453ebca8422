//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit, CORS, metrics)
//! - Serve on a bound listener until shutdown is signalled
//!
//! No request timeout is installed: a slow store call must still end in the
//! handler's own response (degraded 200 on `/`, 503 on `/health`).

use axum::{
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::middleware::track_metrics;
use crate::http::request::{make_span, UuidRequestId};
use crate::store::Store;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let state = AppState { store };
        let router = build_router(&config, state);
        Self { router }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &AppConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::index))
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/stats", get(handlers::stats))
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
