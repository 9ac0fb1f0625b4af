//! Output types of drill selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{Drill, Mastery};

/// Why a drill was chosen for today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionReason {
    /// Review due date has passed.
    Overdue,
    /// Attempted, not yet due, but mastery is still low.
    LowMastery,
    /// Never attempted.
    New,
}

/// A drill picked for today, with the progress context that got it picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedDrill {
    pub drill: Drill,
    pub reason: SelectionReason,
    /// `None` for never-attempted drills.
    pub mastery: Option<Mastery>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub next_review_due_at: Option<DateTime<Utc>>,
}

impl SelectedDrill {
    pub fn drill_id(&self) -> &str {
        &self.drill.id
    }
}
