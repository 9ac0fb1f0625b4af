//! Grading request/result and attempt records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::{Drill, DrillType, Rubric};

/// Everything a grader needs to score one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRequest {
    pub drill_id: String,
    pub drill_type: DrillType,
    pub prompt: String,
    pub rubric: Rubric,
    pub response: String,
}

impl GradingRequest {
    pub fn for_drill(drill: &Drill, response: impl Into<String>) -> Self {
        Self {
            drill_id: drill.id.clone(),
            drill_type: drill.drill_type,
            prompt: drill.prompt_markdown.clone(),
            rubric: drill.rubric.clone(),
            response: response.into(),
        }
    }
}

/// Score breakdown returned by a grader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Points awarded per rubric criterion, keyed by criterion name.
    #[serde(default)]
    pub criterion_scores: BTreeMap<String, u32>,
    pub total_score: u32,
    pub max_score: u32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub follow_up_question: Option<String>,
}

impl GradingResult {
    /// `total_score / max_score`, or 0.0 when the rubric is worth zero points.
    ///
    /// A zero-point rubric is a content problem; it resolves to the poor
    /// performance branch instead of dividing by zero.
    pub fn score_percentage(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.max_score as f64
    }
}

/// Append-only record of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillAttempt {
    pub id: String,
    pub user_id: String,
    pub drill_id: String,
    pub user_response: String,
    pub feedback: GradingResult,
    pub score: u32,
    pub max_score: u32,
    pub created_at: DateTime<Utc>,
}

impl DrillAttempt {
    pub fn new(
        user_id: impl Into<String>,
        drill_id: impl Into<String>,
        user_response: impl Into<String>,
        feedback: GradingResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            drill_id: drill_id.into(),
            user_response: user_response.into(),
            score: feedback.total_score,
            max_score: feedback.max_score,
            feedback,
            created_at,
        }
    }
}
