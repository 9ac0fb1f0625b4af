//! Core types for drillwise.

mod drill;
mod grading;
mod mastery;
mod message;
mod progress;
mod selection;

pub use drill::{normalize_tag, Drill, DrillSummary, DrillType, Rubric, RubricCriterion};
pub use grading::{DrillAttempt, GradingRequest, GradingResult};
pub use mastery::Mastery;
pub use message::{Message, MessageRole};
pub use progress::UserDrillProgress;
pub use selection::{SelectedDrill, SelectionReason};
