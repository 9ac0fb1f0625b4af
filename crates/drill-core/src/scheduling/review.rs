//! Review scheduling: when a drill comes due again.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};
use crate::types::Mastery;

/// Review interval in days, indexed by mastery level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIntervals {
    pub days: [u32; 6],
}

impl Default for ReviewIntervals {
    fn default() -> Self {
        Self {
            // unseen, exposed, basic recall, clear explanation, applied, confident
            days: [1, 1, 3, 7, 14, 30],
        }
    }
}

impl ReviewIntervals {
    /// Intervals must be at least a day and never shrink as mastery grows.
    pub fn validate(&self) -> DrillResult<()> {
        if self.days.iter().any(|&d| d == 0) {
            return Err(DrillError::Configuration(
                "review intervals must be at least one day".to_string(),
            ));
        }
        if self.days.windows(2).any(|w| w[0] > w[1]) {
            return Err(DrillError::Configuration(format!(
                "review intervals must not decrease with mastery: {:?}",
                self.days
            )));
        }
        Ok(())
    }

    pub fn for_mastery(&self, mastery: Mastery) -> Duration {
        Duration::days(self.days[mastery.value() as usize] as i64)
    }
}

/// Maps a mastery level and reference time to the next review time.
///
/// Deterministic: the reference time is always supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ReviewScheduler {
    intervals: ReviewIntervals,
}

impl ReviewScheduler {
    /// Create a scheduler with the default interval table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler with a custom interval table.
    pub fn with_intervals(intervals: ReviewIntervals) -> Self {
        Self { intervals }
    }

    /// Interval that follows an attempt leaving the drill at `mastery`.
    pub fn interval(&self, mastery: Mastery) -> Duration {
        self.intervals.for_mastery(mastery)
    }

    /// Raw-level form: fails with `InvalidMastery` outside 0-5.
    pub fn next_due(
        &self,
        mastery: i64,
        reference_time: DateTime<Utc>,
    ) -> DrillResult<DateTime<Utc>> {
        self.schedule(Mastery::new(mastery)?, reference_time)
    }

    /// `reference_time + interval(mastery)`.
    pub fn schedule(
        &self,
        mastery: Mastery,
        reference_time: DateTime<Utc>,
    ) -> DrillResult<DateTime<Utc>> {
        reference_time
            .checked_add_signed(self.interval(mastery))
            .ok_or_else(|| {
                DrillError::validation(format!(
                    "reference time {} is too far in the future to schedule",
                    reference_time
                ))
            })
    }
}
