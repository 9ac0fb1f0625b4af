//! LLM-backed rubric grader.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use drill_core::config::GradingConfig;
use drill_core::error::{DrillError, DrillResult};
use drill_core::traits::{GenerationOptions, GradingProvider, Llm, ResponseFormat};
use drill_core::types::{GradingRequest, GradingResult, Message};

use crate::json_parser::parse_grading;
use crate::prompts::{grading_system_prompt, grading_user_prompt};

/// Grades responses by asking an LLM to score them against the rubric.
///
/// Transient LLM failures are retried with exponential backoff; anything
/// else surfaces as a grading error without retry.
pub struct LlmGrader {
    llm: Arc<dyn Llm>,
    retry: GradingConfig,
    name: String,
}

impl LlmGrader {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        let name = format!("llm:{}", llm.model_name());
        Self {
            llm,
            retry: GradingConfig::default(),
            name,
        }
    }

    /// Builder: set the retry policy.
    pub fn with_retry(mut self, retry: GradingConfig) -> Self {
        self.retry = retry;
        self
    }

    fn messages(request: &GradingRequest) -> Vec<Message> {
        vec![
            Message::system(grading_system_prompt(request.drill_type)),
            Message::user(grading_user_prompt(request)),
        ]
    }
}

#[async_trait]
impl GradingProvider for LlmGrader {
    async fn grade(&self, request: &GradingRequest) -> DrillResult<GradingResult> {
        let messages = Self::messages(request);
        let options = GenerationOptions {
            response_format: self
                .llm
                .supports_json_mode()
                .then_some(ResponseFormat::Json),
            ..Default::default()
        };

        let generate_once = || async { self.llm.generate(&messages, Some(options.clone())).await };

        let response = generate_once
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(self.retry.max_retries as usize)
                    .with_min_delay(Duration::from_millis(self.retry.initial_delay_ms))
                    .with_max_delay(Duration::from_millis(self.retry.max_delay_ms)),
            )
            .when(DrillError::is_transient)
            .notify(|err, dur| {
                warn!(
                    drill_id = %request.drill_id,
                    model = self.llm.model_name(),
                    "Grading call failed, retrying in {:?}: {}",
                    dur,
                    err
                );
            })
            .await
            .map_err(|e| {
                DrillError::grading_with_source(
                    format!("{} could not grade drill '{}'", self.name, request.drill_id),
                    e,
                )
            })?;

        let grade = parse_grading(response.content_or_empty(), request.rubric.max_score())
            .map_err(|e| {
                DrillError::invalid_grade(
                    format!("{} returned an unusable grade for drill '{}'", self.name, request.drill_id),
                    e,
                )
            })?;

        debug!(
            drill_id = %request.drill_id,
            total = grade.total_score,
            max = grade.max_score,
            tokens = response.usage.as_ref().map(|u| u.total_tokens),
            "LLM grade parsed"
        );

        Ok(grade)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
