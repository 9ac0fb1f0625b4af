//! drill-core - Core library for drillwise.
//!
//! This crate provides the domain types, store and grading traits, and the
//! adaptive scheduling engine: mastery updates, review intervals and daily
//! drill selection.
//!
//! # Example
//!
//! ```ignore
//! use drill_core::{DrillEngine, EngineConfig, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::from_catalog_file("drills.json")?);
//! let engine = DrillEngine::new(&EngineConfig::default(), store.clone(), store, grader)?;
//!
//! // Submit a response
//! let outcome = engine.submit_attempt("user1", "drill-1", "Ownership moves...", Utc::now()).await?;
//!
//! // Today's queue
//! let drills = engine.todays_drills("user1", None, Utc::now()).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod scheduling;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{EngineConfig, GradingConfig, LlmProvider, LlmProviderConfig};
pub use engine::{AttemptOutcome, DrillEngine};
pub use error::{DrillError, DrillResult, ErrorCode};
pub use scheduling::{
    DrillSelector, MasteryThresholds, MasteryUpdater, PerformanceTier, ReviewIntervals,
    ReviewScheduler,
};
pub use store::InMemoryStore;
pub use traits::{
    DrillCatalog, GenerationOptions, GradingProvider, Llm, LlmConfig, LlmResponse, ProgressStore,
    ResponseFormat, TokenUsage,
};
pub use types::{
    Drill, DrillAttempt, DrillSummary, DrillType, GradingRequest, GradingResult, Mastery, Message, MessageRole,
    Rubric, RubricCriterion, SelectedDrill, SelectionReason, UserDrillProgress,
};
