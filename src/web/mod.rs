//! HTTP surface: router assembly, handlers, and error mapping.
//!
//! Thin handlers, following the teacher's layering — every handler parses
//! its inputs, calls into a domain module (`registry`, `route`,
//! `dependency`, `discovery`), and serializes the result. No business logic
//! lives here.

pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::health::HealthEngine;
use crate::store::Store;
pub use state::AppState;

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Arc<Config>, store: Store, health: HealthEngine) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
        let api_prefix = config.api_prefix.clone();
        let state = AppState { store, config, health };
        let app = Self::build_router(state, &api_prefix);
        Ok(Self { app, addr })
    }

    fn build_router(state: AppState, api_prefix: &str) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .nest(api_prefix, Self::api_routes())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    fn api_routes() -> Router<AppState> {
        Router::new()
            .route(
                "/services",
                post(handlers::services::register).get(handlers::services::list),
            )
            .route(
                "/services/:id",
                get(handlers::services::get)
                    .put(handlers::services::update)
                    .delete(handlers::services::unregister),
            )
            .route(
                "/services/:id/heartbeat",
                post(handlers::services::heartbeat),
            )
            .route(
                "/services/:id/dependencies",
                get(handlers::dependencies::outgoing),
            )
            .route(
                "/services/:id/dependents",
                get(handlers::dependencies::incoming),
            )
            .route("/gateways", get(handlers::discovery::gateways))
            .route("/discover/:id", get(handlers::discovery::discover))
            .route(
                "/dependencies",
                post(handlers::dependencies::create).get(handlers::dependencies::list),
            )
            .route("/dependencies/:id", delete(handlers::dependencies::delete))
            .route("/topology", get(handlers::dependencies::topology))
            .route(
                "/routes",
                post(handlers::routes::create).get(handlers::routes::list),
            )
            .route(
                "/routes/:id",
                get(handlers::routes::get)
                    .put(handlers::routes::update)
                    .delete(handlers::routes::delete),
            )
            .route("/gateway/routes", get(handlers::routes::gateway_routes))
            .route("/monitor/overview", get(handlers::monitor::overview))
            .route(
                "/monitor/health-check",
                post(handlers::monitor::trigger_health_check),
            )
            .route("/health", get(handlers::health))
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        tracing::info!("listening on http://{}", self.addr);
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Exposes the assembled router without binding a socket, for
    /// `tower::ServiceExt::oneshot`-driven tests.
    pub fn router(self) -> Router {
        self.app
    }
}
