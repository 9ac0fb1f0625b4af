//! JSON parsing utilities for grader replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

use drill_core::error::{DrillError, DrillResult, ErrorCode};
use drill_core::types::GradingResult;

static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("code block pattern is valid"));
static FENCED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[a-zA-Z0-9]*\n?([\s\S]*?)\n?```$").expect("fence pattern is valid")
});
static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("think pattern is valid"));

/// Extract JSON from potentially wrapped response (code blocks, prose).
pub fn extract_json(text: &str) -> String {
    let text = text.trim();

    if let Some(content) = CODE_BLOCK_RE.captures(text).and_then(|c| c.get(1)) {
        return content.as_str().trim().to_string();
    }

    // Fall back to the outermost object when the model wrapped it in prose.
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Remove code fences and thinking tags from a response.
pub fn remove_code_blocks(content: &str) -> String {
    let content = THINK_RE.replace_all(content, "");
    let content = content.trim();

    FENCED_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(content)
        .to_string()
}

/// Grade as the model writes it: scores may come back as floats and
/// totals may be missing.
#[derive(Debug, Deserialize)]
struct RawGrade {
    #[serde(default)]
    criterion_scores: BTreeMap<String, f64>,
    #[serde(default)]
    total_score: Option<f64>,
    #[serde(default)]
    max_score: Option<f64>,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    follow_up_question: Option<String>,
}

fn to_points(field: &str, value: f64) -> DrillResult<u32> {
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(DrillError::parse(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value.round() as u32)
}

/// Parse a grading reply into a [`GradingResult`].
///
/// `rubric_max` fills in `max_score` when the reply omits it; a missing
/// `total_score` is the sum of the criterion scores.
pub fn parse_grading(response: &str, rubric_max: u32) -> DrillResult<GradingResult> {
    let cleaned = remove_code_blocks(response);
    let json_str = extract_json(&cleaned);
    if json_str.is_empty() {
        return Err(DrillError::Parse {
            message: "Grader returned an empty response".to_string(),
            code: ErrorCode::ParseMissingField,
        });
    }

    let raw: RawGrade = serde_json::from_str(&json_str).map_err(|e| DrillError::Parse {
        message: format!("Failed to parse grading JSON: {}", e),
        code: ErrorCode::ParseInvalidJson,
    })?;

    let criterion_scores = raw
        .criterion_scores
        .into_iter()
        .map(|(name, score)| {
            let points = to_points(&name, score)?;
            Ok((name, points))
        })
        .collect::<DrillResult<BTreeMap<String, u32>>>()?;

    let total_score = match raw.total_score {
        Some(total) => to_points("total_score", total)?,
        None if !criterion_scores.is_empty() => criterion_scores
            .values()
            .try_fold(0u32, |acc, &points| acc.checked_add(points))
            .ok_or_else(|| DrillError::parse("criterion scores overflow the total"))?,
        None => {
            return Err(DrillError::Parse {
                message: "Grading JSON has neither total_score nor criterion_scores".to_string(),
                code: ErrorCode::ParseMissingField,
            })
        }
    };

    let max_score = match raw.max_score {
        Some(max) => to_points("max_score", max)?,
        None => rubric_max,
    };

    Ok(GradingResult {
        criterion_scores,
        total_score,
        max_score,
        feedback: raw.feedback,
        strengths: raw.strengths,
        improvements: raw.improvements,
        follow_up_question: raw
            .follow_up_question
            .filter(|q| !q.trim().is_empty()),
    })
}
