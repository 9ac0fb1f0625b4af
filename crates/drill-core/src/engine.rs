//! Orchestration of attempts and daily selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{DrillError, DrillResult};
use crate::scheduling::{DrillSelector, MasteryUpdater, ReviewScheduler};
use crate::traits::{DrillCatalog, GradingProvider, ProgressStore};
use crate::types::{
    Drill, DrillAttempt, DrillSummary, GradingRequest, GradingResult, Mastery, SelectedDrill,
    UserDrillProgress,
};

/// What a submission produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub attempt_id: String,
    pub drill_id: String,
    pub feedback: GradingResult,
    /// Mastery before this attempt; 0 on a first attempt.
    pub previous_mastery: Mastery,
    pub mastery: Mastery,
    pub next_review_due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Per-(user, drill) async locks, created on demand.
///
/// Entries nobody holds or waits on are pruned the next time a lock is taken.
#[derive(Default)]
struct AttemptLocks {
    inner: Mutex<HashMap<(String, String), Arc<AsyncMutex<()>>>>,
}

impl AttemptLocks {
    async fn acquire(&self, user_id: &str, drill_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry((user_id.to_string(), drill_id.to_string()))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Ties the catalog, progress store and grader to the scheduling components.
pub struct DrillEngine {
    catalog: Arc<dyn DrillCatalog>,
    progress: Arc<dyn ProgressStore>,
    grader: Arc<dyn GradingProvider>,
    updater: MasteryUpdater,
    scheduler: ReviewScheduler,
    selector: DrillSelector,
    daily_limit: usize,
    locks: Option<AttemptLocks>,
}

impl DrillEngine {
    /// Create an engine over the given collaborators.
    ///
    /// The grader is built separately (see the drill-llm crate for the
    /// LLM-backed one) so tests can supply a scripted grader.
    pub fn new(
        config: &EngineConfig,
        catalog: Arc<dyn DrillCatalog>,
        progress: Arc<dyn ProgressStore>,
        grader: Arc<dyn GradingProvider>,
    ) -> DrillResult<Self> {
        config.validate()?;

        Ok(Self {
            selector: DrillSelector::new(progress.clone(), catalog.clone()),
            catalog,
            progress,
            grader,
            updater: MasteryUpdater::with_thresholds(config.mastery.clone()),
            scheduler: ReviewScheduler::with_intervals(config.intervals.clone()),
            daily_limit: config.daily_limit,
            locks: config.serialize_attempts.then(AttemptLocks::default),
        })
    }

    /// Default number of drills for "today".
    pub fn daily_limit(&self) -> usize {
        self.daily_limit
    }

    /// Name of the grading collaborator.
    pub fn grader_name(&self) -> &str {
        self.grader.name()
    }

    /// Catalog record for `drill_id`.
    pub async fn drill(&self, drill_id: &str) -> DrillResult<Drill> {
        self.catalog
            .get_drill(drill_id)
            .await?
            .ok_or_else(|| DrillError::not_found(drill_id))
    }

    /// Summaries of a unit's drills, ordered by slug.
    ///
    /// A unit with no drills in the catalog is reported as not found.
    pub async fn unit_drills(&self, unit_id: &str) -> DrillResult<Vec<DrillSummary>> {
        let drills = self.catalog.list_by_unit(unit_id).await?;
        if drills.is_empty() {
            return Err(DrillError::unit_not_found(unit_id));
        }
        Ok(drills.into_iter().map(DrillSummary::from).collect())
    }

    /// Catalog record for the drill with `slug` inside `unit_id`.
    pub async fn unit_drill(&self, unit_id: &str, slug: &str) -> DrillResult<Drill> {
        self.catalog
            .get_drill_by_slug(unit_id, slug)
            .await?
            .ok_or_else(|| DrillError::slug_not_found(unit_id, slug))
    }

    /// Drills to practice as of `now`, using the configured daily limit when
    /// `limit` is `None`.
    pub async fn todays_drills(
        &self,
        user_id: &str,
        limit: Option<i64>,
        now: DateTime<Utc>,
    ) -> DrillResult<Vec<SelectedDrill>> {
        let limit = match limit {
            Some(limit) => limit,
            None => i64::try_from(self.daily_limit).map_err(|_| DrillError::InvalidLimit {
                value: i64::MAX,
            })?,
        };
        self.selector.select(user_id, limit, now).await
    }

    /// Grade a response and record its effect on the user's progress.
    ///
    /// Nothing is written when grading fails or the grade is unusable.
    pub async fn submit_attempt(
        &self,
        user_id: &str,
        drill_id: &str,
        response: &str,
        now: DateTime<Utc>,
    ) -> DrillResult<AttemptOutcome> {
        let drill = self.drill(drill_id).await?;

        let request = GradingRequest::for_drill(&drill, response);
        let feedback = self.grader.grade(&request).await?;
        let score = feedback.score_percentage();
        debug!(
            user_id,
            drill_id,
            total = feedback.total_score,
            max = feedback.max_score,
            score,
            "graded attempt"
        );

        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(user_id, drill_id).await),
            None => None,
        };

        let existing = self.progress.get_drill_progress(user_id, drill_id).await?;
        let previous_mastery = existing.as_ref().map(|p| p.mastery).unwrap_or_default();
        let mastery = self.updater.advance(previous_mastery, score)?;
        let next_review_due_at = self.scheduler.schedule(mastery, now)?;

        let record = match existing {
            Some(mut record) => {
                record.record_attempt(mastery, now, next_review_due_at)?;
                record
            }
            None => UserDrillProgress::first_attempt(
                user_id,
                drill_id,
                mastery,
                now,
                next_review_due_at,
            )?,
        };

        let attempt = DrillAttempt::new(user_id, drill_id, response, feedback, now);
        let attempt_id = self.progress.insert_attempt(&attempt).await?;
        self.progress.upsert_progress(&record).await?;

        info!(
            user_id,
            drill_id,
            attempt_id = %attempt_id,
            previous = %previous_mastery,
            mastery = %mastery,
            due = %next_review_due_at,
            "attempt recorded"
        );

        Ok(AttemptOutcome {
            attempt_id,
            drill_id: drill_id.to_string(),
            feedback: attempt.feedback,
            previous_mastery,
            mastery,
            next_review_due_at,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::traits::MockGradingProvider;
    use crate::types::{DrillType, Rubric, RubricCriterion};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
    }

    fn drill(id: &str) -> Drill {
        Drill {
            id: id.to_string(),
            unit_id: "unit".to_string(),
            slug: id.to_string(),
            drill_type: DrillType::Explain,
            prompt_markdown: "Explain ownership transfer on assignment.".to_string(),
            rubric: Rubric {
                criteria: vec![
                    RubricCriterion::new("accuracy", "Correct facts", 6),
                    RubricCriterion::new("clarity", "Clear wording", 4),
                ],
                ..Default::default()
            },
            difficulty: 2,
            estimated_minutes: 5,
            concept_tags: vec!["ownership".to_string()],
            created_at: now() - Duration::days(30),
            updated_at: None,
        }
    }

    fn result(total: u32, max: u32) -> GradingResult {
        GradingResult {
            total_score: total,
            max_score: max,
            feedback: "ok".to_string(),
            ..Default::default()
        }
    }

    fn engine(grader: MockGradingProvider) -> (DrillEngine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::with_drills(vec![drill("d1")]).unwrap());
        let engine = DrillEngine::new(
            &EngineConfig::default(),
            store.clone(),
            store.clone(),
            Arc::new(grader),
        )
        .unwrap();
        (engine, store)
    }

    #[tokio::test]
    async fn test_first_attempt_is_exposed() {
        let mut grader = MockGradingProvider::new();
        grader
            .expect_grade()
            .times(1)
            .returning(|_| Ok(result(10, 10)));
        let (engine, store) = engine(grader);

        let outcome = engine
            .submit_attempt("u", "d1", "Ownership moves on assignment.", now())
            .await
            .unwrap();

        assert_eq!(outcome.previous_mastery, Mastery::UNSEEN);
        assert_eq!(outcome.mastery, Mastery::EXPOSED);
        assert_eq!(outcome.next_review_due_at, now() + Duration::days(1));

        let row = store.get_drill_progress("u", "d1").await.unwrap().unwrap();
        assert_eq!(row.attempt_count, 1);
        assert_eq!(store.attempts_for("u").await.len(), 1);
    }

    #[tokio::test]
    async fn test_grader_sees_drill_rubric() {
        let mut grader = MockGradingProvider::new();
        grader
            .expect_grade()
            .withf(|req| {
                req.drill_id == "d1" && req.rubric.max_score() == 10 && req.response == "my answer"
            })
            .times(1)
            .returning(|_| Ok(result(5, 10)));
        let (engine, _) = engine(grader);

        engine.submit_attempt("u", "d1", "my answer", now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_grader_failure_writes_nothing() {
        let mut grader = MockGradingProvider::new();
        grader
            .expect_grade()
            .returning(|_| Err(DrillError::grading("model unavailable")));
        let (engine, store) = engine(grader);

        let err = engine.submit_attempt("u", "d1", "answer", now()).await.unwrap_err();
        assert!(matches!(err, DrillError::Grading { .. }));
        assert!(store.get_progress("u").await.unwrap().is_empty());
        assert!(store.attempts_for("u").await.is_empty());
    }

    #[tokio::test]
    async fn test_total_above_max_rejected_before_writes() {
        let mut grader = MockGradingProvider::new();
        grader.expect_grade().returning(|_| Ok(result(12, 10)));
        let (engine, store) = engine(grader);

        let err = engine.submit_attempt("u", "d1", "answer", now()).await.unwrap_err();
        assert!(matches!(err, DrillError::InvalidScorePercentage { .. }));
        assert!(store.attempts_for("u").await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_drill_never_grades() {
        let mut grader = MockGradingProvider::new();
        grader.expect_grade().never();
        let (engine, _) = engine(grader);

        let err = engine.submit_attempt("u", "nope", "answer", now()).await.unwrap_err();
        assert!(matches!(err, DrillError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_locks_are_pruned() {
        let locks = AttemptLocks::default();
        {
            let _a = locks.acquire("u", "d1").await;
            let _b = locks.acquire("u", "d2").await;
            assert_eq!(locks.len(), 2);
        }
        let _c = locks.acquire("u", "d3").await;
        assert_eq!(locks.len(), 1);
    }
}
