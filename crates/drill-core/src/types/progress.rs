//! Per-(user, drill) progress tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};
use crate::types::Mastery;

/// A user's standing on one drill they have attempted at least once.
///
/// Invariant: `next_review_due_at >= last_attempt_at`. Reviews are never
/// scheduled in the past relative to the attempt that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDrillProgress {
    pub user_id: String,
    pub drill_id: String,
    #[serde(rename = "mastery_score")]
    pub mastery: Mastery,
    #[serde(default)]
    pub attempt_count: u32,
    pub last_attempt_at: DateTime<Utc>,
    pub next_review_due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDrillProgress {
    /// Progress row for a first attempt.
    pub fn first_attempt(
        user_id: impl Into<String>,
        drill_id: impl Into<String>,
        mastery: Mastery,
        attempted_at: DateTime<Utc>,
        next_review_due_at: DateTime<Utc>,
    ) -> DrillResult<Self> {
        check_schedule(attempted_at, next_review_due_at)?;
        Ok(Self {
            user_id: user_id.into(),
            drill_id: drill_id.into(),
            mastery,
            attempt_count: 1,
            last_attempt_at: attempted_at,
            next_review_due_at,
            created_at: attempted_at,
            updated_at: attempted_at,
        })
    }

    /// Apply the outcome of a later attempt.
    pub fn record_attempt(
        &mut self,
        mastery: Mastery,
        attempted_at: DateTime<Utc>,
        next_review_due_at: DateTime<Utc>,
    ) -> DrillResult<()> {
        check_schedule(attempted_at, next_review_due_at)?;
        self.mastery = mastery;
        self.attempt_count += 1;
        self.last_attempt_at = attempted_at;
        self.next_review_due_at = next_review_due_at;
        self.updated_at = attempted_at;
        Ok(())
    }

    /// Review was due strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.next_review_due_at < now
    }
}

fn check_schedule(attempted_at: DateTime<Utc>, due: DateTime<Utc>) -> DrillResult<()> {
    if due < attempted_at {
        return Err(DrillError::validation(format!(
            "next review {} precedes attempt at {}",
            due, attempted_at
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_first_attempt() {
        let p = UserDrillProgress::first_attempt("u", "d", Mastery::EXPOSED, at(), at() + Duration::days(1))
            .unwrap();
        assert_eq!(p.attempt_count, 1);
        assert_eq!(p.created_at, at());
    }

    #[test]
    fn test_rejects_due_before_attempt() {
        let result =
            UserDrillProgress::first_attempt("u", "d", Mastery::EXPOSED, at(), at() - Duration::hours(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_attempt_increments() {
        let mut p = UserDrillProgress::first_attempt("u", "d", Mastery::EXPOSED, at(), at() + Duration::days(1))
            .unwrap();
        let later = at() + Duration::days(2);
        p.record_attempt(Mastery::new(2).unwrap(), later, later + Duration::days(3))
            .unwrap();
        assert_eq!(p.attempt_count, 2);
        assert_eq!(p.mastery.value(), 2);
        assert_eq!(p.last_attempt_at, later);
        assert_eq!(p.created_at, at());
    }

    #[test]
    fn test_is_overdue_is_strict() {
        let p = UserDrillProgress::first_attempt("u", "d", Mastery::EXPOSED, at(), at() + Duration::days(1))
            .unwrap();
        assert!(!p.is_overdue(at() + Duration::days(1)));
        assert!(p.is_overdue(at() + Duration::days(1) + Duration::seconds(1)));
    }

    #[test]
    fn test_serializes_mastery_score() {
        let p = UserDrillProgress::first_attempt("u", "d", Mastery::EXPOSED, at(), at()).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["mastery_score"], 1);
    }
}
