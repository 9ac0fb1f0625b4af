//! Store capabilities the engine reads from and writes to.
//!
//! Persistence technology is outside the engine; anything that honors these
//! contracts can back it. [`crate::store::InMemoryStore`] implements both.

use async_trait::async_trait;

use crate::error::DrillResult;
use crate::types::{Drill, DrillAttempt, UserDrillProgress};

/// Per-user progress and the attempt log.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All progress rows for a user, in a stable store order.
    async fn get_progress(&self, user_id: &str) -> DrillResult<Vec<UserDrillProgress>>;

    /// The progress row for one (user, drill) pair, if the user attempted it.
    async fn get_drill_progress(
        &self,
        user_id: &str,
        drill_id: &str,
    ) -> DrillResult<Option<UserDrillProgress>>;

    /// Insert or replace the row keyed by (user_id, drill_id).
    async fn upsert_progress(&self, record: &UserDrillProgress) -> DrillResult<()>;

    /// Append an attempt and return its identifier.
    async fn insert_attempt(&self, attempt: &DrillAttempt) -> DrillResult<String>;
}

/// Read-only drill catalog.
#[async_trait]
pub trait DrillCatalog: Send + Sync {
    async fn get_drill(&self, drill_id: &str) -> DrillResult<Option<Drill>>;

    /// Drills for the given ids. Unknown ids are silently absent; order is
    /// not guaranteed.
    async fn get_drills_by_ids(&self, ids: &[String]) -> DrillResult<Vec<Drill>>;

    /// Every drill, oldest `created_at` first.
    async fn list_all(&self) -> DrillResult<Vec<Drill>>;

    /// Drills belonging to a unit, ordered by slug.
    async fn list_by_unit(&self, unit_id: &str) -> DrillResult<Vec<Drill>>;

    /// The drill with `slug` inside `unit_id`.
    async fn get_drill_by_slug(&self, unit_id: &str, slug: &str) -> DrillResult<Option<Drill>>;
}
