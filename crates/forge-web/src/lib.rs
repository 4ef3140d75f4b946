//! Forge A2A Server
//!
//! Axum-based front-end that exposes an agent over the A2A protocol.

pub mod routes;
pub mod service;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use service::{A2aConfig, A2aService};
use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(routes::rpc::handle))
        .route("/.well-known/agent.json", get(routes::card::get_card))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
