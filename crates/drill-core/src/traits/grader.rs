//! Grading capability.

use async_trait::async_trait;

use crate::error::DrillResult;
use crate::types::{GradingRequest, GradingResult};

/// Scores a free-text response against a drill rubric.
///
/// Opaque to the engine: an LLM, a human reviewer queue, or a scripted fake
/// in tests. Network timeouts and retries belong to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradingProvider: Send + Sync {
    async fn grade(&self, request: &GradingRequest) -> DrillResult<GradingResult>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "grader"
    }
}
