//! Route definitions for the REST API.

mod drills;
mod health;
mod units;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let drill_routes = Router::new()
        .route("/drills/today", get(drills::todays_drills))
        .route("/drills/:id", get(drills::get_drill))
        .route("/drills/:id/attempts", post(drills::submit_attempt))
        .route("/units/:unit_id/drills", get(units::list_unit_drills))
        .route("/units/:unit_id/drills/:slug", get(units::get_unit_drill))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .merge(drill_routes)
        // Attach state
        .with_state(state)
}

pub use drills::*;
pub use health::*;
pub use units::*;
