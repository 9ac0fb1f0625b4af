//! drill-server - REST API server for drillwise.
//!
//! This crate exposes the drill engine over HTTP.
//!
//! # Example
//!
//! ```ignore
//! use drill_server::{create_server, factory, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = factory::load_config(None).unwrap();
//!     let store = factory::load_store(None).unwrap();
//!     let engine = factory::create_engine(&config, store.clone()).unwrap();
//!     let app = create_server(AppState::new(engine, store));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod extract;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::CurrentUser;
pub use factory::create_engine;
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(axum_middleware::from_fn(middleware::logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::cors_layer()),
    )
}
