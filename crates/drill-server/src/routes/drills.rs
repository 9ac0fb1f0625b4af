//! Drill endpoints: today's queue, drill lookup, attempt submission.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drill_core::types::{Drill, Mastery, SelectedDrill, SelectionReason};
use drill_core::AttemptOutcome;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::state::AppState;

/// Shortest response worth sending to the grader.
pub const MIN_RESPONSE_CHARS: usize = 10;

/// Query parameters for today's drills.
#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub limit: Option<i64>,
}

/// A drill in today's queue with the progress that got it picked.
#[derive(Debug, Serialize)]
pub struct TodayDrill {
    #[serde(flatten)]
    pub drill: Drill,
    pub reason: SelectionReason,
    pub mastery_score: Option<Mastery>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub next_review_due_at: Option<DateTime<Utc>>,
}

impl From<SelectedDrill> for TodayDrill {
    fn from(s: SelectedDrill) -> Self {
        Self {
            drill: s.drill,
            reason: s.reason,
            mastery_score: s.mastery,
            last_attempt_at: s.last_attempt_at,
            next_review_due_at: s.next_review_due_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub drills: Vec<TodayDrill>,
    pub total_available: usize,
    pub limit: i64,
    pub user_id: String,
}

/// Today's personalized drill queue.
/// GET /drills/today?limit=N
pub async fn todays_drills(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiQuery(query): ApiQuery<TodayQuery>,
) -> ApiResult<Json<TodayResponse>> {
    let engine = state.engine();
    let limit = query
        .limit
        .unwrap_or_else(|| i64::try_from(engine.daily_limit()).unwrap_or(i64::MAX));

    let drills: Vec<TodayDrill> = engine
        .todays_drills(&user_id, Some(limit), Utc::now())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(TodayResponse {
        total_available: drills.len(),
        drills,
        limit,
        user_id,
    }))
}

/// Get a drill by ID.
/// GET /drills/:id
pub async fn get_drill(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(drill_id): Path<String>,
) -> ApiResult<Json<Drill>> {
    Ok(Json(state.engine().drill(&drill_id).await?))
}

/// Request body for submitting an attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    pub user_response: String,
}

/// Graded attempt with the updated mastery.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub attempt_id: String,
    pub drill_id: String,
    pub total_score: u32,
    pub max_score: u32,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub follow_up_question: Option<String>,
    pub mastery_score: Mastery,
    pub next_review_due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<AttemptOutcome> for AttemptResponse {
    fn from(outcome: AttemptOutcome) -> Self {
        let feedback = outcome.feedback;
        Self {
            attempt_id: outcome.attempt_id,
            drill_id: outcome.drill_id,
            total_score: feedback.total_score,
            max_score: feedback.max_score,
            feedback: feedback.feedback,
            strengths: feedback.strengths,
            improvements: feedback.improvements,
            follow_up_question: feedback.follow_up_question,
            mastery_score: outcome.mastery,
            next_review_due_at: outcome.next_review_due_at,
            created_at: outcome.created_at,
        }
    }
}

/// Submit a response for grading.
/// POST /drills/:id/attempts
pub async fn submit_attempt(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(drill_id): Path<String>,
    ApiJson(request): ApiJson<SubmitAttemptRequest>,
) -> ApiResult<Json<AttemptResponse>> {
    if request.user_response.chars().count() < MIN_RESPONSE_CHARS {
        return Err(ApiError::validation(format!(
            "user_response must be at least {} characters",
            MIN_RESPONSE_CHARS
        )));
    }

    let outcome = state
        .engine()
        .submit_attempt(&user_id, &drill_id, &request.user_response, Utc::now())
        .await?;

    Ok(Json(outcome.into()))
}
