//! Factory for creating the engine from configuration.

use std::path::Path;
use std::sync::Arc;

use drill_core::config::EngineConfig;
use drill_core::error::DrillResult;
use drill_core::{DrillEngine, InMemoryStore};
use drill_llm::LlmFactory;
use tracing::info;

/// Load engine configuration from a file when given, else from the environment.
pub fn load_config(path: Option<&Path>) -> DrillResult<EngineConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading engine configuration");
            EngineConfig::from_file(path)
        }
        None => EngineConfig::from_env(),
    }
}

/// Seed the in-memory store from a catalog file, or start empty.
pub fn load_store(catalog: Option<&Path>) -> DrillResult<Arc<InMemoryStore>> {
    let store = match catalog {
        Some(path) => InMemoryStore::from_catalog_file(path)?,
        None => InMemoryStore::new(),
    };
    Ok(Arc::new(store))
}

/// Create a DrillEngine with an LLM grader built from `config.llm`.
pub fn create_engine(config: &EngineConfig, store: Arc<InMemoryStore>) -> DrillResult<DrillEngine> {
    let grader = LlmFactory::grader(&config.llm, config.grading.clone())?;
    info!(
        provider = ?config.llm.provider,
        grader = grader.name(),
        daily_limit = config.daily_limit,
        "Engine created"
    );
    DrillEngine::new(config, store.clone(), store, grader)
}
