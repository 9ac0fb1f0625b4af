//! Adaptive scheduling: mastery ladder, review intervals, daily selection.

mod mastery;
mod review;
mod selector;

pub use mastery::{MasteryThresholds, MasteryUpdater, PerformanceTier};
pub use review::{ReviewIntervals, ReviewScheduler};
pub use selector::{DrillSelector, Selection};
