//! Configuration system for drillwise.

use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};
use crate::scheduling::{MasteryThresholds, ReviewIntervals};
use crate::traits::LlmConfig;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider type.
    pub provider: LlmProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: LlmConfig,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            config: LlmConfig {
                model: "gpt-4o".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Retry policy for grading calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Maximum number of retries after the first failed call.
    pub max_retries: u32,
    /// Initial delay before the first retry (milliseconds).
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (milliseconds).
    pub max_delay_ms: u64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 200,
            max_delay_ms: 2_000,
        }
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drills returned for "today" when the caller gives no limit.
    pub daily_limit: usize,
    /// Score thresholds for the mastery ladder.
    pub mastery: MasteryThresholds,
    /// Review interval per mastery level.
    pub intervals: ReviewIntervals,
    /// Serialize concurrent attempts on the same (user, drill) pair.
    pub serialize_attempts: bool,
    /// LLM used for grading.
    pub llm: LlmProviderConfig,
    /// Grading retry policy.
    pub grading: GradingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_limit: 3,
            mastery: MasteryThresholds::default(),
            intervals: ReviewIntervals::default(),
            serialize_attempts: true,
            llm: LlmProviderConfig::default(),
            grading: GradingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DrillResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| DrillError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| DrillError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| DrillError::Configuration(e.to_string()))?,
            _ => {
                return Err(DrillError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> DrillResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup on top of the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DrillResult<Self> {
        let mut config = Self::default();

        if let Some(limit) = lookup("DRILL_DAILY_LIMIT") {
            config.daily_limit = limit.parse().map_err(|_| {
                DrillError::Configuration(format!("DRILL_DAILY_LIMIT must be a number, got '{}'", limit))
            })?;
        }

        if let Some(provider) = lookup("DRILL_LLM_PROVIDER") {
            config.llm.provider = match provider.to_lowercase().as_str() {
                "openai" => LlmProvider::OpenAI,
                "anthropic" => {
                    config.llm.config.model = "claude-3-5-sonnet-20240620".to_string();
                    LlmProvider::Anthropic
                }
                other => {
                    return Err(DrillError::UnsupportedProvider {
                        provider: other.to_string(),
                    })
                }
            };
        }
        if let Some(model) = lookup("DRILL_LLM_MODEL") {
            config.llm.config.model = model;
        }
        if let Some(base_url) = lookup("DRILL_LLM_BASE_URL") {
            config.llm.config.base_url = Some(base_url);
        }
        if let Some(api_key) = lookup(config.llm.provider.api_key_var()) {
            config.llm.config.api_key = Some(api_key);
        }

        if let Some(flag) = lookup("DRILL_SERIALIZE_ATTEMPTS") {
            config.serialize_attempts = !matches!(flag.to_lowercase().as_str(), "0" | "false" | "no");
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scheduling components cannot honor.
    pub fn validate(&self) -> DrillResult<()> {
        if self.daily_limit == 0 {
            return Err(DrillError::Configuration(
                "daily_limit must be greater than zero".to_string(),
            ));
        }
        self.mastery.validate()?;
        self.intervals.validate()?;
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the default daily limit.
    pub fn daily_limit(mut self, limit: usize) -> Self {
        self.config.daily_limit = limit;
        self
    }

    /// Set mastery ladder thresholds.
    pub fn mastery(mut self, thresholds: MasteryThresholds) -> Self {
        self.config.mastery = thresholds;
        self
    }

    /// Set review intervals.
    pub fn intervals(mut self, intervals: ReviewIntervals) -> Self {
        self.config.intervals = intervals;
        self
    }

    /// Enable or disable per-(user, drill) attempt serialization.
    pub fn serialize_attempts(mut self, enabled: bool) -> Self {
        self.config.serialize_attempts = enabled;
        self
    }

    /// Set LLM configuration.
    pub fn llm(mut self, config: LlmProviderConfig) -> Self {
        self.config.llm = config;
        self
    }

    /// Set grading retry policy.
    pub fn grading(mut self, config: GradingConfig) -> Self {
        self.config.grading = config;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> DrillResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
