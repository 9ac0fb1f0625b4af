//! Error types for drill scheduling operations.
//!
//! All engine errors are local validation failures or collaborator failures,
//! each carrying a structured error code and, where useful, a suggestion.

use thiserror::Error;

/// Result type alias for drill operations.
pub type DrillResult<T> = Result<T, DrillError>;

/// Main error type for all drill operations.
#[derive(Error, Debug)]
pub enum DrillError {
    /// Mastery level outside the 0-5 scale.
    #[error("Invalid mastery: {value} is outside 0-5")]
    InvalidMastery { value: i64 },

    /// Score percentage outside [0, 1] or not a number.
    #[error("Invalid score percentage: {value}")]
    InvalidScorePercentage { value: f64 },

    /// Selection limit must be positive.
    #[error("Invalid limit: {value} (must be greater than zero)")]
    InvalidLimit { value: i64 },

    /// Drill or unit not found in the catalog.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        drill_id: Option<String>,
    },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Grading collaborator failed.
    #[error("Grading error: {message}")]
    Grading {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Store collaborator failed.
    #[error("Store error: {message}")]
    Store {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM operation failed.
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        code: ErrorCode,
        /// Whether retrying the call may succeed.
        transient: bool,
    },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Scheduling (SCH_xxx)
    SchInvalidMastery,
    SchInvalidScore,
    SchInvalidLimit,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValInvalidDrill,

    // Catalog (CAT_xxx)
    CatDrillNotFound,
    CatUnitNotFound,

    // Grading (GRD_xxx)
    GrdFailed,
    GrdInvalidResult,

    // Store (STO_xxx)
    StoWriteFailed,

    // LLM (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseMissingField,

    // Configuration
    Configuration,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::SchInvalidMastery => "SCH_001",
            ErrorCode::SchInvalidScore => "SCH_002",
            ErrorCode::SchInvalidLimit => "SCH_003",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValInvalidDrill => "VAL_002",
            ErrorCode::CatDrillNotFound => "CAT_001",
            ErrorCode::CatUnitNotFound => "CAT_002",
            ErrorCode::GrdFailed => "GRD_001",
            ErrorCode::GrdInvalidResult => "GRD_002",
            ErrorCode::StoWriteFailed => "STO_002",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseMissingField => "PARSE_002",
            ErrorCode::Configuration => "CFG_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl DrillError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: None,
        }
    }

    /// Create an invalid drill content error.
    pub fn invalid_drill(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidDrill,
            suggestion: None,
        }
    }

    /// Create a not found error.
    pub fn not_found(drill_id: impl Into<String>) -> Self {
        let id = drill_id.into();
        Self::NotFound {
            message: format!("Drill with id '{}' not found", id),
            code: ErrorCode::CatDrillNotFound,
            drill_id: Some(id),
        }
    }

    /// Create a not found error for a slug within a unit.
    pub fn slug_not_found(unit_id: &str, slug: &str) -> Self {
        Self::NotFound {
            message: format!("Drill '{}' not found in unit '{}'", slug, unit_id),
            code: ErrorCode::CatDrillNotFound,
            drill_id: None,
        }
    }

    /// Create a not found error for a unit with no drills in the catalog.
    pub fn unit_not_found(unit_id: &str) -> Self {
        Self::NotFound {
            message: format!("Unit '{}' not found", unit_id),
            code: ErrorCode::CatUnitNotFound,
            drill_id: None,
        }
    }

    /// Create a grading error.
    pub fn grading(message: impl Into<String>) -> Self {
        Self::Grading {
            message: message.into(),
            code: ErrorCode::GrdFailed,
            source: None,
        }
    }

    /// Create a grading error caused by a lower-level failure.
    pub fn grading_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Grading {
            message: message.into(),
            code: ErrorCode::GrdFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create an error for a grader reply that cannot be used as a grade.
    pub fn invalid_grade(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Grading {
            message: message.into(),
            code: ErrorCode::GrdInvalidResult,
            source: Some(Box::new(source)),
        }
    }

    /// Create a store write error.
    pub fn store_write(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoWriteFailed,
            source: None,
        }
    }

    /// Create a permanent LLM error.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            transient: false,
        }
    }

    /// Create an LLM error that may succeed on retry (network, 5xx, rate limit).
    pub fn llm_transient(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            code: ErrorCode::LlmConnectionFailed,
            transient: true,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Whether a collaborator call failing with this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Llm { transient: true, .. })
    }

    /// Whether this error is a caller-side validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidMastery { .. }
                | Self::InvalidScorePercentage { .. }
                | Self::InvalidLimit { .. }
                | Self::Validation { .. }
        )
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidMastery { .. } => ErrorCode::SchInvalidMastery,
            Self::InvalidScorePercentage { .. } => ErrorCode::SchInvalidScore,
            Self::InvalidLimit { .. } => ErrorCode::SchInvalidLimit,
            Self::NotFound { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::Grading { code, .. } => *code,
            Self::Store { code, .. } => *code,
            Self::Llm { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Configuration(_) | Self::UnsupportedProvider { .. } => ErrorCode::Configuration,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidMastery { .. } => Some("Mastery levels run from 0 (unseen) to 5 (confident)"),
            Self::InvalidScorePercentage { .. } => {
                Some("Score percentage must be total_score / max_score, between 0 and 1")
            }
            Self::InvalidLimit { .. } => Some("Request at least one drill"),
            Self::NotFound {
                code: ErrorCode::CatUnitNotFound,
                ..
            } => Some("Please check the unit ID and ensure it exists"),
            Self::NotFound { .. } => Some("Please check the drill ID and ensure it exists"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Llm { .. } => Some("Please check your LLM provider configuration"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DrillError::validation("Invalid input");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("Invalid input"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_unit_not_found_error() {
        let err = DrillError::unit_not_found("ownership");
        assert_eq!(err.code().as_str(), "CAT_002");
        assert_eq!(err.to_string(), "Not found: Unit 'ownership' not found");
        assert!(err.suggestion().unwrap().contains("unit ID"));
    }

    #[test]
    fn test_not_found_error() {
        let err = DrillError::not_found("drill-1");
        assert_eq!(err.code(), ErrorCode::CatDrillNotFound);
        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("drill-1"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_invalid_mastery_error() {
        let err = DrillError::InvalidMastery { value: 6 };
        assert_eq!(err.code().as_str(), "SCH_001");
        assert!(err.is_validation());
    }

    #[test]
    fn test_transient_llm_error() {
        assert!(DrillError::llm_transient("timeout").is_transient());
        assert!(!DrillError::llm("bad request").is_transient());
        assert!(!DrillError::grading("boom").is_transient());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::CatDrillNotFound.as_str(), "CAT_001");
        assert_eq!(ErrorCode::ParseInvalidJson.as_str(), "PARSE_001");
    }
}
