//! Capability traits the engine is composed from.

mod grader;
mod llm;
mod store;

pub use grader::*;
pub use llm::*;
pub use store::*;
