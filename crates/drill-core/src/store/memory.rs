//! In-memory store backing both store capabilities.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::RwLock;

use crate::error::{DrillError, DrillResult};
use crate::traits::{DrillCatalog, ProgressStore};
use crate::types::{Drill, DrillAttempt, UserDrillProgress};

/// Process-local store for drills, progress and attempts.
///
/// Progress rows keep insertion order, which is the stable order
/// [`ProgressStore::get_progress`] reports.
#[derive(Default)]
pub struct InMemoryStore {
    drills: RwLock<Vec<Drill>>,
    progress: RwLock<Vec<UserDrillProgress>>,
    attempts: RwLock<Vec<DrillAttempt>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a validated catalog.
    pub fn with_drills(drills: Vec<Drill>) -> DrillResult<Self> {
        let mut ids = HashSet::new();
        let mut slugs = HashSet::new();
        for drill in &drills {
            drill.validate()?;
            if !ids.insert(drill.id.as_str()) {
                return Err(DrillError::invalid_drill(format!(
                    "duplicate drill id '{}'",
                    drill.id
                )));
            }
            if !slugs.insert((drill.unit_id.as_str(), drill.slug.as_str())) {
                return Err(DrillError::invalid_drill(format!(
                    "duplicate slug '{}' in unit '{}'",
                    drill.slug, drill.unit_id
                )));
            }
        }

        Ok(Self {
            drills: RwLock::new(drills),
            ..Default::default()
        })
    }

    /// Create a store seeded from a JSON array of drills.
    pub fn from_catalog_file(path: impl AsRef<Path>) -> DrillResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let drills: Vec<Drill> = serde_json::from_str(&content)?;
        Self::with_drills(drills)
    }

    /// Number of drills in the catalog.
    pub async fn drill_count(&self) -> usize {
        self.drills.read().await.len()
    }

    /// Attempts recorded for a user, oldest first.
    pub async fn attempts_for(&self, user_id: &str) -> Vec<DrillAttempt> {
        self.attempts
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Remove a drill from the catalog, leaving any progress that references it.
    pub async fn retire_drill(&self, drill_id: &str) -> bool {
        let mut drills = self.drills.write().await;
        let before = drills.len();
        drills.retain(|d| d.id != drill_id);
        drills.len() != before
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn get_progress(&self, user_id: &str) -> DrillResult<Vec<UserDrillProgress>> {
        Ok(self
            .progress
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_drill_progress(
        &self,
        user_id: &str,
        drill_id: &str,
    ) -> DrillResult<Option<UserDrillProgress>> {
        Ok(self
            .progress
            .read()
            .await
            .iter()
            .find(|p| p.user_id == user_id && p.drill_id == drill_id)
            .cloned())
    }

    async fn upsert_progress(&self, record: &UserDrillProgress) -> DrillResult<()> {
        let mut progress = self.progress.write().await;
        match progress
            .iter_mut()
            .find(|p| p.user_id == record.user_id && p.drill_id == record.drill_id)
        {
            Some(existing) => *existing = record.clone(),
            None => progress.push(record.clone()),
        }
        Ok(())
    }

    async fn insert_attempt(&self, attempt: &DrillAttempt) -> DrillResult<String> {
        let mut attempts = self.attempts.write().await;
        if attempts.iter().any(|a| a.id == attempt.id) {
            return Err(DrillError::store_write(format!(
                "attempt '{}' already recorded",
                attempt.id
            )));
        }
        attempts.push(attempt.clone());
        Ok(attempt.id.clone())
    }
}

#[async_trait]
impl DrillCatalog for InMemoryStore {
    async fn get_drill(&self, drill_id: &str) -> DrillResult<Option<Drill>> {
        Ok(self
            .drills
            .read()
            .await
            .iter()
            .find(|d| d.id == drill_id)
            .cloned())
    }

    async fn get_drills_by_ids(&self, ids: &[String]) -> DrillResult<Vec<Drill>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Ok(self
            .drills
            .read()
            .await
            .iter()
            .filter(|d| wanted.contains(d.id.as_str()))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> DrillResult<Vec<Drill>> {
        let mut drills = self.drills.read().await.clone();
        drills.sort_by_key(|d| d.created_at);
        Ok(drills)
    }

    async fn list_by_unit(&self, unit_id: &str) -> DrillResult<Vec<Drill>> {
        let mut drills: Vec<Drill> = self
            .drills
            .read()
            .await
            .iter()
            .filter(|d| d.unit_id == unit_id)
            .cloned()
            .collect();
        drills.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(drills)
    }

    async fn get_drill_by_slug(&self, unit_id: &str, slug: &str) -> DrillResult<Option<Drill>> {
        Ok(self
            .drills
            .read()
            .await
            .iter()
            .find(|d| d.unit_id == unit_id && d.slug == slug)
            .cloned())
    }
}
