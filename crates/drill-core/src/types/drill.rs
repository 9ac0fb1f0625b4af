//! Drill catalog types.
//!
//! A drill is an atomic practice exercise: a prompt plus the rubric used to
//! grade free-text responses to it. The engine treats drills as read-only.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{DrillError, DrillResult};

/// Concept tags are lowercase words joined by single hyphens.
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("tag pattern is valid"));

/// Kind of exercise a drill presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DrillType {
    Quiz,
    Explain,
    Debug,
}

/// A single criterion in a grading rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Points available for this criterion (1-10).
    pub max_score: u32,
}

impl RubricCriterion {
    pub fn new(name: impl Into<String>, description: impl Into<String>, max_score: u32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            max_score,
        }
    }
}

/// Complete rubric for grading a drill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    /// Ordered scoring criteria.
    pub criteria: Vec<RubricCriterion>,
    #[serde(default)]
    pub expected_key_points: Vec<String>,
    #[serde(default)]
    pub common_mistakes: Vec<String>,
    #[serde(default)]
    pub followup_questions: Vec<String>,
    #[serde(default)]
    pub model_answer_outline: Vec<String>,
}

impl Rubric {
    /// Total points available across all criteria.
    pub fn max_score(&self) -> u32 {
        self.criteria.iter().map(|c| c.max_score).sum()
    }
}

/// Drill entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub id: String,
    /// Unit the drill belongs to; `slug` is unique within it.
    #[serde(default)]
    pub unit_id: String,
    pub slug: String,
    pub drill_type: DrillType,
    pub prompt_markdown: String,
    pub rubric: Rubric,
    /// 1 (easiest) to 5 (hardest).
    pub difficulty: u8,
    pub estimated_minutes: u32,
    pub concept_tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Drill {
    /// Check the content invariants the catalog is expected to uphold.
    pub fn validate(&self) -> DrillResult<()> {
        if self.id.trim().is_empty() {
            return Err(DrillError::invalid_drill("drill id must not be empty"));
        }
        if self.slug.trim().is_empty() {
            return Err(DrillError::invalid_drill(format!(
                "drill '{}' has an empty slug",
                self.id
            )));
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(DrillError::invalid_drill(format!(
                "drill '{}' difficulty {} is outside 1-5",
                self.slug, self.difficulty
            )));
        }
        if self.estimated_minutes < 1 {
            return Err(DrillError::invalid_drill(format!(
                "drill '{}' must take at least one minute",
                self.slug
            )));
        }
        if self.concept_tags.is_empty() {
            return Err(DrillError::invalid_drill(format!(
                "drill '{}' has no concept tags",
                self.slug
            )));
        }
        if let Some(tag) = self.concept_tags.iter().find(|t| !TAG_RE.is_match(t)) {
            return Err(DrillError::invalid_drill(format!(
                "drill '{}' tag '{}' is not lowercase-hyphenated (try '{}')",
                self.slug,
                tag,
                normalize_tag(tag)
            )));
        }
        if let Some(c) = self
            .rubric
            .criteria
            .iter()
            .find(|c| !(1..=10).contains(&c.max_score))
        {
            return Err(DrillError::invalid_drill(format!(
                "drill '{}' criterion '{}' max score {} is outside 1-10",
                self.slug, c.name, c.max_score
            )));
        }
        Ok(())
    }
}

/// Lightweight drill listing without prompt or rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSummary {
    pub id: String,
    pub slug: String,
    pub drill_type: DrillType,
    pub difficulty: u8,
    pub estimated_minutes: u32,
    pub concept_tags: Vec<String>,
}

impl From<Drill> for DrillSummary {
    fn from(drill: Drill) -> Self {
        Self {
            id: drill.id,
            slug: drill.slug,
            drill_type: drill.drill_type,
            difficulty: drill.difficulty,
            estimated_minutes: drill.estimated_minutes,
            concept_tags: drill.concept_tags,
        }
    }
}

/// Normalize a free-form concept tag to lowercase-hyphenated form.
///
/// `"Memory  Ordering"` and `"memory_ordering"` both become `"memory-ordering"`.
pub fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    for ch in tag.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn drill() -> Drill {
        Drill {
            id: "d1".to_string(),
            unit_id: "u1".to_string(),
            slug: "tcp-handshake".to_string(),
            drill_type: DrillType::Explain,
            prompt_markdown: "Explain the TCP three-way handshake.".to_string(),
            rubric: Rubric {
                criteria: vec![
                    RubricCriterion::new("correctness", "Accurate steps", 5),
                    RubricCriterion::new("clarity", "Peer could follow", 3),
                ],
                expected_key_points: vec!["SYN".into(), "SYN-ACK".into(), "ACK".into()],
                ..Default::default()
            },
            difficulty: 2,
            estimated_minutes: 5,
            concept_tags: vec!["networking".into(), "tcp-handshake".into()],
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_rubric_max_score() {
        assert_eq!(drill().rubric.max_score(), 8);
        assert_eq!(Rubric::default().max_score(), 0);
    }

    #[test]
    fn test_valid_drill() {
        assert!(drill().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_difficulty() {
        let mut d = drill();
        d.difficulty = 6;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_rejects_unnormalized_tag() {
        let mut d = drill();
        d.concept_tags.push("Memory Ordering".into());
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("memory-ordering"));
    }

    #[test]
    fn test_rejects_empty_tags() {
        let mut d = drill();
        d.concept_tags.clear();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_rejects_criterion_out_of_range() {
        let mut d = drill();
        d.rubric.criteria.push(RubricCriterion::new("depth", "", 11));
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Memory  Ordering"), "memory-ordering");
        assert_eq!(normalize_tag("memory_ordering"), "memory-ordering");
        assert_eq!(normalize_tag(" -Rust! "), "rust");
    }

    #[test]
    fn test_drill_type_strings() {
        assert_eq!(DrillType::Debug.to_string(), "debug");
        assert_eq!("quiz".parse::<DrillType>().unwrap(), DrillType::Quiz);
        assert_eq!(serde_json::to_string(&DrillType::Explain).unwrap(), "\"explain\"");
    }
}
