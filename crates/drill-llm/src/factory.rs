//! Factory for creating LLM providers and graders.

use std::sync::Arc;

use drill_core::config::{GradingConfig, LlmProvider, LlmProviderConfig};
use drill_core::error::DrillResult;
use drill_core::traits::{GradingProvider, Llm, LlmConfig};

use crate::anthropic::AnthropicLlm;
use crate::grader::LlmGrader;
use crate::openai::OpenAIProvider;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> DrillResult<Arc<dyn Llm>> {
        match provider {
            LlmProvider::OpenAI => Ok(Arc::new(OpenAIProvider::new(config)?)),
            LlmProvider::Anthropic => Ok(Arc::new(AnthropicLlm::new(config)?)),
        }
    }

    /// Create an LLM provider from a typed provider configuration.
    pub fn from_config(config: &LlmProviderConfig) -> DrillResult<Arc<dyn Llm>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create an LLM-backed grader with the given retry policy.
    pub fn grader(
        config: &LlmProviderConfig,
        retry: GradingConfig,
    ) -> DrillResult<Arc<dyn GradingProvider>> {
        let llm = Self::from_config(config)?;
        Ok(Arc::new(LlmGrader::new(llm).with_retry(retry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_config(provider: LlmProvider) -> LlmProviderConfig {
        LlmProviderConfig {
            provider,
            config: LlmConfig {
                model: "test-model".to_string(),
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_from_config() {
        let llm = LlmFactory::from_config(&provider_config(LlmProvider::Anthropic)).unwrap();
        assert_eq!(llm.model_name(), "test-model");
        assert!(!llm.supports_json_mode());
    }

    #[test]
    fn test_grader_name() {
        let grader =
            LlmFactory::grader(&provider_config(LlmProvider::OpenAI), GradingConfig::default())
                .unwrap();
        assert_eq!(grader.name(), "llm:test-model");
    }
}
