//! Daily drill selection.
//!
//! Selection runs as a three-phase pipeline over a snapshot of the user's
//! progress. Each phase spends only the budget the previous phases left:
//!
//! 1. **Overdue**: review due before the reference time, lowest mastery first.
//! 2. **Low mastery**: not overdue, mastery at or below the ceiling, lowest first.
//! 3. **New**: catalog drills the user never attempted, oldest content first.
//!
//! A [`Selection`] accumulator threads the already-picked drill ids through
//! every phase, so the output never repeats a drill.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{DrillError, DrillResult};
use crate::traits::{DrillCatalog, ProgressStore};
use crate::types::{Drill, Mastery, SelectedDrill, SelectionReason, UserDrillProgress};

/// Accumulates picked drills against a fixed budget.
#[derive(Debug)]
pub struct Selection {
    budget: usize,
    picked: Vec<SelectedDrill>,
    seen: HashSet<String>,
}

impl Selection {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            picked: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.budget - self.picked.len()
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn contains(&self, drill_id: &str) -> bool {
        self.seen.contains(drill_id)
    }

    /// Add a drill unless the budget is spent or the drill is already picked.
    pub fn push(&mut self, selected: SelectedDrill) -> bool {
        if self.is_full() || self.seen.contains(selected.drill_id()) {
            return false;
        }
        self.seen.insert(selected.drill.id.clone());
        self.picked.push(selected);
        true
    }

    pub fn len(&self) -> usize {
        self.picked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    pub fn into_drills(self) -> Vec<SelectedDrill> {
        self.picked
    }
}

/// Picks up to N drills for "today".
pub struct DrillSelector {
    progress: Arc<dyn ProgressStore>,
    catalog: Arc<dyn DrillCatalog>,
    low_mastery_ceiling: Mastery,
}

impl DrillSelector {
    pub fn new(progress: Arc<dyn ProgressStore>, catalog: Arc<dyn DrillCatalog>) -> Self {
        Self {
            progress,
            catalog,
            low_mastery_ceiling: Mastery::BASIC_RECALL,
        }
    }

    /// Select up to `limit` drills for `user_id` as of `reference_time`.
    ///
    /// Under-fill is valid: fewer than `limit` drills come back when the
    /// three phases run out of candidates.
    pub async fn select(
        &self,
        user_id: &str,
        limit: i64,
        reference_time: DateTime<Utc>,
    ) -> DrillResult<Vec<SelectedDrill>> {
        if limit <= 0 {
            return Err(DrillError::InvalidLimit { value: limit });
        }
        let budget = usize::try_from(limit).map_err(|_| DrillError::InvalidLimit { value: limit })?;

        let progress = self.progress.get_progress(user_id).await?;
        let mut selection = Selection::new(budget);

        let mut overdue: Vec<&UserDrillProgress> = progress
            .iter()
            .filter(|p| p.is_overdue(reference_time))
            .collect();
        overdue.sort_by_key(|p| p.mastery);
        let added = self
            .fill_from_progress(&mut selection, &overdue, SelectionReason::Overdue)
            .await?;
        debug!(user_id, candidates = overdue.len(), added, "overdue phase");

        if !selection.is_full() {
            let mut low: Vec<&UserDrillProgress> = progress
                .iter()
                .filter(|p| {
                    !p.is_overdue(reference_time)
                        && p.mastery <= self.low_mastery_ceiling
                        && !selection.contains(&p.drill_id)
                })
                .collect();
            low.sort_by_key(|p| p.mastery);
            let added = self
                .fill_from_progress(&mut selection, &low, SelectionReason::LowMastery)
                .await?;
            debug!(user_id, candidates = low.len(), added, "low mastery phase");
        }

        if !selection.is_full() {
            let attempted: HashSet<&str> = progress.iter().map(|p| p.drill_id.as_str()).collect();
            let added = self.fill_new(&mut selection, &attempted).await?;
            debug!(user_id, added, "new phase");
        }

        Ok(selection.into_drills())
    }

    /// Fill from ordered progress candidates, fetching drill records only for
    /// the ids chosen. Candidates whose drill has left the catalog are skipped
    /// and the next candidates take their place.
    async fn fill_from_progress(
        &self,
        selection: &mut Selection,
        candidates: &[&UserDrillProgress],
        reason: SelectionReason,
    ) -> DrillResult<usize> {
        let mut added = 0;
        let mut cursor = 0;

        while !selection.is_full() && cursor < candidates.len() {
            let end = (cursor + selection.remaining()).min(candidates.len());
            let batch = &candidates[cursor..end];
            cursor = end;

            let ids: Vec<String> = batch.iter().map(|p| p.drill_id.clone()).collect();
            let drills: HashMap<String, Drill> = self
                .catalog
                .get_drills_by_ids(&ids)
                .await?
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect();

            for row in batch {
                let Some(drill) = drills.get(&row.drill_id) else {
                    warn!(
                        user_id = %row.user_id,
                        drill_id = %row.drill_id,
                        "progress references a drill missing from the catalog, skipping"
                    );
                    continue;
                };
                let picked = selection.push(SelectedDrill {
                    drill: drill.clone(),
                    reason,
                    mastery: Some(row.mastery),
                    last_attempt_at: Some(row.last_attempt_at),
                    next_review_due_at: Some(row.next_review_due_at),
                });
                if picked {
                    added += 1;
                }
            }
        }

        Ok(added)
    }

    async fn fill_new(
        &self,
        selection: &mut Selection,
        attempted: &HashSet<&str>,
    ) -> DrillResult<usize> {
        let mut added = 0;
        for drill in self.catalog.list_all().await? {
            if selection.is_full() {
                break;
            }
            if attempted.contains(drill.id.as_str()) {
                continue;
            }
            let picked = selection.push(SelectedDrill {
                drill,
                reason: SelectionReason::New,
                mastery: None,
                last_attempt_at: None,
                next_review_due_at: None,
            });
            if picked {
                added += 1;
            }
        }
        Ok(added)
    }
}
