//! drill-llm - LLM providers and rubric grading for drillwise.
//!
//! This crate provides LLM provider implementations and [`LlmGrader`], the
//! grading collaborator the drill engine calls to score free-text responses.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - GPT-4o and compatible endpoints
//! - **Anthropic** - Claude 3.5 via the Messages API
//!
//! # Example
//!
//! ```ignore
//! use drill_llm::LlmFactory;
//!
//! let grader = LlmFactory::grader(&config.llm, config.grading.clone())?;
//! let engine = DrillEngine::new(&config, catalog, progress, grader)?;
//! ```

mod anthropic;
mod factory;
mod grader;
pub mod json_parser;
mod openai;
pub mod prompts;

pub use anthropic::AnthropicLlm;
pub use factory::LlmFactory;
pub use grader::LlmGrader;
pub use openai::OpenAIProvider;

// Re-export core types for convenience
pub use drill_core::config::LlmProvider;
pub use drill_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse, ResponseFormat};
