//! Unit browsing endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use drill_core::types::{Drill, DrillSummary};

use crate::error::ApiResult;
use crate::state::AppState;

/// List a unit's drills as summaries, ordered by slug.
/// GET /units/:unit_id/drills
pub async fn list_unit_drills(
    State(state): State<AppState>,
    Path(unit_id): Path<String>,
) -> ApiResult<Json<Vec<DrillSummary>>> {
    Ok(Json(state.engine().unit_drills(&unit_id).await?))
}

/// Get a drill by unit and slug.
/// GET /units/:unit_id/drills/:slug
pub async fn get_unit_drill(
    State(state): State<AppState>,
    Path((unit_id, slug)): Path<(String, String)>,
) -> ApiResult<Json<Drill>> {
    Ok(Json(state.engine().unit_drill(&unit_id, &slug).await?))
}
