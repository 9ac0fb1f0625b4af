//! Prompt templates for rubric grading.

use std::fmt::Write;

use drill_core::types::{DrillType, GradingRequest};

const GRADING_SYSTEM_PROMPT: &str = r#"You are an expert systems engineer evaluating CS student responses.

Your role:
- Grade responses against explicit rubrics
- Focus on correctness, completeness, and clarity
- Provide actionable, specific feedback
- Identify strengths before improvements
- Be encouraging but honest

Grading philosophy:
- Correctness: Is the explanation technically accurate?
- Completeness: Did they cover the key concepts?
- Clarity: Can a peer understand their explanation?
- Terminology: Do they use correct technical terms?

Never award a criterion more than its maximum points.

Always return valid JSON with this structure:
{
  "criterion_scores": {"criterion_name": score_int, ...},
  "total_score": sum_of_scores_int,
  "max_score": max_possible_int,
  "feedback": "detailed feedback string",
  "strengths": ["strength 1", "strength 2"],
  "improvements": ["improvement 1", "improvement 2"],
  "follow_up_question": "optional clarifying question or null"
}"#;

const EXPLAIN_ADDENDUM: &str = r#"For explain drills:
- Look for clear mental models, not memorized definitions
- Reward examples and analogies
- Flag conceptual misunderstandings immediately"#;

const DEBUG_ADDENDUM: &str = r#"For debug drills:
- Evaluate the reasoning process, not just the answer
- Look for systematic thinking and elimination
- Reward mentioning tools or debugging approaches"#;

/// System prompt for grading a drill of the given type.
pub fn grading_system_prompt(drill_type: DrillType) -> String {
    match drill_type {
        DrillType::Explain => format!("{}\n\n{}", GRADING_SYSTEM_PROMPT, EXPLAIN_ADDENDUM),
        DrillType::Debug => format!("{}\n\n{}", GRADING_SYSTEM_PROMPT, DEBUG_ADDENDUM),
        DrillType::Quiz => GRADING_SYSTEM_PROMPT.to_string(),
    }
}

fn bullet_list(items: impl IntoIterator<Item = String>) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
    if out.is_empty() {
        out.push_str("- (none)\n");
    }
    out
}

/// User prompt carrying the drill, the response and the rubric.
pub fn grading_user_prompt(request: &GradingRequest) -> String {
    let rubric = &request.rubric;
    let criteria = bullet_list(rubric.criteria.iter().map(|c| {
        format!("{}: {} (max {} points)", c.name, c.description, c.max_score)
    }));
    let key_points = bullet_list(rubric.expected_key_points.iter().cloned());
    let mistakes = bullet_list(rubric.common_mistakes.iter().cloned());

    format!(
        r#"DRILL PROMPT:
{prompt}

STUDENT RESPONSE:
{response}

GRADING CRITERIA (max {max} points total):
{criteria}
EXPECTED KEY POINTS:
{key_points}
COMMON MISTAKES TO WATCH FOR:
{mistakes}
Please evaluate this response and return your assessment as JSON."#,
        prompt = request.prompt,
        response = request.response,
        max = rubric.max_score(),
        criteria = criteria,
        key_points = key_points,
        mistakes = mistakes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::types::{Rubric, RubricCriterion};

    fn request(drill_type: DrillType) -> GradingRequest {
        GradingRequest {
            drill_id: "d1".to_string(),
            drill_type,
            prompt: "Explain borrowing.".to_string(),
            rubric: Rubric {
                criteria: vec![
                    RubricCriterion::new("accuracy", "Correct rules", 6),
                    RubricCriterion::new("clarity", "Readable", 4),
                ],
                expected_key_points: vec!["shared vs mutable".to_string()],
                ..Default::default()
            },
            response: "You can borrow many times immutably.".to_string(),
        }
    }

    #[test]
    fn test_system_prompt_addenda() {
        assert!(grading_system_prompt(DrillType::Explain).contains("For explain drills"));
        assert!(grading_system_prompt(DrillType::Debug).contains("For debug drills"));
        let quiz = grading_system_prompt(DrillType::Quiz);
        assert!(!quiz.contains("For explain drills"));
        assert!(!quiz.contains("For debug drills"));
    }

    #[test]
    fn test_user_prompt_lists_rubric() {
        let prompt = grading_user_prompt(&request(DrillType::Explain));
        assert!(prompt.contains("- accuracy: Correct rules (max 6 points)"));
        assert!(prompt.contains("max 10 points total"));
        assert!(prompt.contains("- shared vs mutable"));
        assert!(prompt.contains("COMMON MISTAKES TO WATCH FOR:\n- (none)"));
        assert!(prompt.contains("You can borrow many times immutably."));
    }
}
