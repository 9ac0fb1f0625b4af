//! Integration tests for the attempt and selection flow.
//!
//! Runs the engine against the in-memory store with a scripted grader.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use drill_core::{
    Drill, DrillEngine, DrillError, DrillResult, DrillType, EngineConfig, GradingProvider,
    GradingRequest, GradingResult, InMemoryStore, Mastery, ProgressStore, Rubric,
    RubricCriterion, SelectionReason,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Returns queued (total, max) pairs, then repeats the last one.
struct ScriptedGrader {
    script: Mutex<VecDeque<(u32, u32)>>,
    last: Mutex<(u32, u32)>,
}

impl ScriptedGrader {
    fn new(script: &[(u32, u32)]) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            last: Mutex::new(script.last().copied().unwrap_or((0, 10))),
        }
    }
}

#[async_trait]
impl GradingProvider for ScriptedGrader {
    async fn grade(&self, _request: &GradingRequest) -> DrillResult<GradingResult> {
        let next = self.script.lock().unwrap().pop_front();
        let (total, max) = next.unwrap_or_else(|| *self.last.lock().unwrap());
        Ok(GradingResult {
            total_score: total,
            max_score: max,
            feedback: format!("{} of {}", total, max),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
}

fn drill(id: &str, created_days_ago: i64) -> Drill {
    Drill {
        id: id.to_string(),
        unit_id: "ownership".to_string(),
        slug: id.to_string(),
        drill_type: DrillType::Quiz,
        prompt_markdown: format!("What happens in {}?", id),
        rubric: Rubric {
            criteria: vec![RubricCriterion::new("correctness", "Right answer", 10)],
            expected_key_points: vec!["moves".to_string()],
            ..Default::default()
        },
        difficulty: 1,
        estimated_minutes: 3,
        concept_tags: vec!["ownership".to_string()],
        created_at: t0() - Duration::days(created_days_ago),
        updated_at: None,
    }
}

fn setup(
    drills: Vec<Drill>,
    script: &[(u32, u32)],
    config: EngineConfig,
) -> (Arc<DrillEngine>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::with_drills(drills).unwrap());
    let engine = DrillEngine::new(
        &config,
        store.clone(),
        store.clone(),
        Arc::new(ScriptedGrader::new(script)),
    )
    .unwrap();
    (Arc::new(engine), store)
}

/// First attempt lands on mastery 1 with a one-day review, whatever the score.
#[tokio::test]
async fn test_first_attempt_schedules_next_day() {
    let (engine, store) = setup(vec![drill("d1", 1)], &[(2, 10)], EngineConfig::default());

    let outcome = engine
        .submit_attempt("alice", "d1", "A move transfers ownership", t0())
        .await
        .unwrap();

    assert_eq!(outcome.mastery, Mastery::EXPOSED);
    assert_eq!(outcome.next_review_due_at, t0() + Duration::days(1));
    assert_eq!(outcome.created_at, t0());
    assert_eq!(outcome.feedback.total_score, 2);

    let row = store.get_drill_progress("alice", "d1").await.unwrap().unwrap();
    assert_eq!(row.mastery, Mastery::EXPOSED);
    assert_eq!(row.last_attempt_at, t0());
    assert_eq!(row.next_review_due_at, t0() + Duration::days(1));

    let attempts = store.attempts_for("alice").await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].id, outcome.attempt_id);
}

/// Walks the ladder through promotion, plateau and demotion.
#[tokio::test]
async fn test_mastery_progression() {
    let script = [(10, 10), (9, 10), (7, 10), (7, 10), (10, 10), (4, 10)];
    let (engine, store) = setup(vec![drill("d1", 1)], &script, EngineConfig::default());

    let expected = [(1, 1), (2, 3), (3, 7), (3, 7), (4, 14), (3, 7)];
    let mut at = t0();
    for (mastery, days) in expected {
        let outcome = engine.submit_attempt("bob", "d1", "response text", at).await.unwrap();
        assert_eq!(outcome.mastery.value(), mastery, "at {}", at);
        assert_eq!(outcome.next_review_due_at, at + Duration::days(days));
        at = outcome.next_review_due_at;
    }

    let row = store.get_drill_progress("bob", "d1").await.unwrap().unwrap();
    assert_eq!(row.attempt_count, 6);
    assert_eq!(row.created_at, t0());
}

/// A rubric worth zero points grades as 0% instead of failing.
#[tokio::test]
async fn test_zero_max_score_is_poor() {
    let script = [(10, 10), (10, 10), (0, 0)];
    let (engine, _) = setup(vec![drill("d1", 1)], &script, EngineConfig::default());

    engine.submit_attempt("carol", "d1", "response", t0()).await.unwrap();
    engine.submit_attempt("carol", "d1", "response", t0()).await.unwrap();
    let outcome = engine.submit_attempt("carol", "d1", "response", t0()).await.unwrap();

    assert_eq!(outcome.previous_mastery.value(), 2);
    assert_eq!(outcome.mastery, Mastery::EXPOSED);
}

#[tokio::test]
async fn test_score_above_max_is_rejected() {
    let (engine, store) = setup(vec![drill("d1", 1)], &[(11, 10)], EngineConfig::default());

    let err = engine
        .submit_attempt("dave", "d1", "response", t0())
        .await
        .unwrap_err();

    assert!(matches!(err, DrillError::InvalidScorePercentage { .. }));
    assert!(store.get_progress("dave").await.unwrap().is_empty());
    assert!(store.attempts_for("dave").await.is_empty());
}

#[tokio::test]
async fn test_unknown_drill() {
    let (engine, _) = setup(vec![drill("d1", 1)], &[], EngineConfig::default());

    let err = engine.submit_attempt("erin", "missing", "response", t0()).await.unwrap_err();
    assert!(matches!(err, DrillError::NotFound { .. }));
    assert!(matches!(engine.drill("missing").await, Err(DrillError::NotFound { .. })));
    assert_eq!(engine.drill("d1").await.unwrap().id, "d1");
}

/// Unit listings are slug-ordered summaries; an empty unit is not found.
#[tokio::test]
async fn test_unit_drills() {
    let (engine, _) = setup(
        vec![drill("moves", 1), drill("borrows", 2), drill("clones", 3)],
        &[],
        EngineConfig::default(),
    );

    let summaries = engine.unit_drills("ownership").await.unwrap();
    let slugs: Vec<&str> = summaries.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec!["borrows", "clones", "moves"]);
    assert_eq!(summaries[0].concept_tags, vec!["ownership"]);

    let err = engine.unit_drills("lifetimes").await.unwrap_err();
    assert_eq!(err.code().as_str(), "CAT_002");

    assert_eq!(engine.unit_drill("ownership", "clones").await.unwrap().id, "clones");
    assert!(matches!(
        engine.unit_drill("lifetimes", "clones").await,
        Err(DrillError::NotFound { .. })
    ));
}

/// Without an explicit limit the configured daily limit applies.
#[tokio::test]
async fn test_todays_drills_default_limit() {
    let drills = (0..5).map(|i| drill(&format!("d{}", i), 10 - i)).collect();
    let config = EngineConfig::builder().daily_limit(2).build().unwrap();
    let (engine, _) = setup(drills, &[], config);

    let today = engine.todays_drills("frank", None, t0()).await.unwrap();
    let ids: Vec<&str> = today.iter().map(|s| s.drill_id()).collect();
    assert_eq!(ids, vec!["d0", "d1"]);

    let today = engine.todays_drills("frank", Some(4), t0()).await.unwrap();
    assert_eq!(today.len(), 4);

    assert!(matches!(
        engine.todays_drills("frank", Some(0), t0()).await,
        Err(DrillError::InvalidLimit { value: 0 })
    ));
}

/// Attempted drills move from the new phase into review phases.
#[tokio::test]
async fn test_attempts_feed_selection() {
    let drills = vec![drill("old", 10), drill("mid", 5), drill("young", 1)];
    let (engine, _) = setup(drills, &[(10, 10)], EngineConfig::default());

    engine.submit_attempt("gina", "mid", "response", t0()).await.unwrap();

    let today = engine.todays_drills("gina", Some(3), t0()).await.unwrap();
    let picked: Vec<(&str, SelectionReason)> =
        today.iter().map(|s| (s.drill_id(), s.reason)).collect();
    assert_eq!(
        picked,
        vec![
            ("mid", SelectionReason::LowMastery),
            ("old", SelectionReason::New),
            ("young", SelectionReason::New),
        ]
    );

    // Two days later the one-day review is overdue.
    let later = engine
        .todays_drills("gina", Some(1), t0() + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(later[0].drill_id(), "mid");
    assert_eq!(later[0].reason, SelectionReason::Overdue);
}

/// Concurrent submissions on one (user, drill) pair never lose an update.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attempts_are_serialized() {
    let (engine, store) = setup(vec![drill("d1", 1)], &[(10, 10)], EngineConfig::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .submit_attempt("hank", "d1", "response", t0())
                    .await
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let row = store.get_drill_progress("hank", "d1").await.unwrap().unwrap();
    assert_eq!(row.attempt_count, 8);
    assert_eq!(row.mastery, Mastery::MAX);
    assert_eq!(store.attempts_for("hank").await.len(), 8);
}

#[tokio::test]
async fn test_rejects_invalid_config() {
    let store = Arc::new(InMemoryStore::new());
    let mut config = EngineConfig::default();
    config.daily_limit = 0;

    let result = DrillEngine::new(&config, store.clone(), store, Arc::new(ScriptedGrader::new(&[])));
    assert!(result.is_err());
    assert_eq!(
        DrillEngine::new(
            &EngineConfig::default(),
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryStore::new()),
            Arc::new(ScriptedGrader::new(&[]))
        )
        .unwrap()
        .grader_name(),
        "scripted"
    );
}
