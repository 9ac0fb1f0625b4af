//! Mastery ladder: maps a graded attempt onto the 0-5 mastery scale.

use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};
use crate::types::Mastery;

/// How well an attempt went, by score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Adequate,
    Poor,
}

/// Score thresholds for the mastery ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryThresholds {
    /// At or above this, mastery always rises (to the cap).
    pub excellent: f64,
    /// At or above this, mastery rises only below `good_plateau`.
    pub good: f64,
    /// At or above this, mastery holds.
    pub adequate: f64,
    /// Level at which "good" stops promoting.
    pub good_plateau: u8,
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.85,
            good: 0.70,
            adequate: 0.50,
            good_plateau: 3,
        }
    }
}

impl MasteryThresholds {
    pub fn validate(&self) -> DrillResult<()> {
        let ordered = 0.0 <= self.adequate
            && self.adequate <= self.good
            && self.good <= self.excellent
            && self.excellent <= 1.0;
        if !ordered {
            return Err(DrillError::Configuration(format!(
                "mastery thresholds must satisfy 0 <= adequate ({}) <= good ({}) <= excellent ({}) <= 1",
                self.adequate, self.good, self.excellent
            )));
        }
        if self.good_plateau > Mastery::MAX.value() {
            return Err(DrillError::Configuration(format!(
                "good_plateau {} is outside 0-5",
                self.good_plateau
            )));
        }
        Ok(())
    }
}

/// Computes the new mastery level after a graded attempt.
///
/// Pure and deterministic: identical inputs always give identical outputs.
#[derive(Debug, Clone, Default)]
pub struct MasteryUpdater {
    thresholds: MasteryThresholds,
}

impl MasteryUpdater {
    /// Create an updater with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an updater with custom thresholds.
    pub fn with_thresholds(thresholds: MasteryThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MasteryThresholds {
        &self.thresholds
    }

    /// Classify a score percentage.
    pub fn tier(&self, score_percentage: f64) -> DrillResult<PerformanceTier> {
        check_score(score_percentage)?;
        let t = &self.thresholds;
        Ok(if score_percentage >= t.excellent {
            PerformanceTier::Excellent
        } else if score_percentage >= t.good {
            PerformanceTier::Good
        } else if score_percentage >= t.adequate {
            PerformanceTier::Adequate
        } else {
            PerformanceTier::Poor
        })
    }

    /// Raw-level form: validates `current_mastery` against 0-5 first.
    pub fn update(&self, current_mastery: i64, score_percentage: f64) -> DrillResult<Mastery> {
        self.advance(Mastery::new(current_mastery)?, score_percentage)
    }

    /// Apply the ladder, first match wins:
    ///
    /// 1. unseen → exposed, whatever the score
    /// 2. excellent → +1, capped at 5
    /// 3. good → +1 below the plateau, else hold
    /// 4. adequate → hold
    /// 5. poor → -1, floored at exposed
    pub fn advance(&self, current: Mastery, score_percentage: f64) -> DrillResult<Mastery> {
        let tier = self.tier(score_percentage)?;

        if current.is_unseen() {
            return Ok(Mastery::EXPOSED);
        }

        Ok(match tier {
            PerformanceTier::Excellent => current.promoted(),
            PerformanceTier::Good if current.value() < self.thresholds.good_plateau => {
                current.promoted()
            }
            PerformanceTier::Good | PerformanceTier::Adequate => current,
            PerformanceTier::Poor => current.demoted(),
        })
    }
}

fn check_score(score_percentage: f64) -> DrillResult<()> {
    if score_percentage.is_nan() || !(0.0..=1.0).contains(&score_percentage) {
        return Err(DrillError::InvalidScorePercentage {
            value: score_percentage,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> impl Iterator<Item = f64> {
        (0..=100).map(|p| p as f64 / 100.0)
    }

    #[test]
    fn test_first_exposure_always_one() {
        let updater = MasteryUpdater::new();
        for score in scores() {
            assert_eq!(updater.update(0, score).unwrap(), Mastery::EXPOSED);
        }
    }

    #[test]
    fn test_output_always_in_range() {
        let updater = MasteryUpdater::new();
        for current in 0..=5 {
            for score in scores() {
                let new = updater.update(current, score).unwrap();
                assert!(new.value() <= 5);
            }
        }
    }

    #[test]
    fn test_excellent_promotes_to_cap() {
        let updater = MasteryUpdater::new();
        for current in 1..=5 {
            for score in [0.85, 0.9, 1.0] {
                let new = updater.update(current, score).unwrap();
                assert_eq!(new.value() as i64, (current + 1).min(5));
            }
        }
    }

    #[test]
    fn test_good_plateaus_at_three() {
        let updater = MasteryUpdater::new();
        assert_eq!(updater.update(1, 0.70).unwrap().value(), 2);
        assert_eq!(updater.update(2, 0.84).unwrap().value(), 3);
        assert_eq!(updater.update(3, 0.84).unwrap().value(), 3);
        assert_eq!(updater.update(4, 0.75).unwrap().value(), 4);
    }

    #[test]
    fn test_adequate_holds() {
        let updater = MasteryUpdater::new();
        for current in 1..=5 {
            assert_eq!(updater.update(current, 0.5).unwrap().value() as i64, current);
            assert_eq!(updater.update(current, 0.69).unwrap().value() as i64, current);
        }
    }

    #[test]
    fn test_poor_demotes_floor_one() {
        let updater = MasteryUpdater::new();
        assert_eq!(updater.update(3, 0.49).unwrap().value(), 2);
        assert_eq!(updater.update(2, 0.0).unwrap().value(), 1);
        assert_eq!(updater.update(1, 0.0).unwrap().value(), 1);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let updater = MasteryUpdater::new();
        assert!(matches!(
            updater.update(6, 0.5),
            Err(DrillError::InvalidMastery { value: 6 })
        ));
        assert!(matches!(
            updater.update(2, 1.01),
            Err(DrillError::InvalidScorePercentage { .. })
        ));
        assert!(matches!(
            updater.update(2, -0.1),
            Err(DrillError::InvalidScorePercentage { .. })
        ));
        assert!(updater.update(2, f64::NAN).is_err());
        // Out-of-range score is rejected even for first exposure.
        assert!(updater.update(0, 2.0).is_err());
    }

    #[test]
    fn test_idempotent() {
        let updater = MasteryUpdater::new();
        for current in 0..=5 {
            for score in scores() {
                assert_eq!(
                    updater.update(current, score).unwrap(),
                    updater.update(current, score).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let updater = MasteryUpdater::new();
        assert_eq!(updater.tier(0.85).unwrap(), PerformanceTier::Excellent);
        assert_eq!(updater.tier(0.70).unwrap(), PerformanceTier::Good);
        assert_eq!(updater.tier(0.50).unwrap(), PerformanceTier::Adequate);
        assert_eq!(updater.tier(0.4999).unwrap(), PerformanceTier::Poor);
    }

    #[test]
    fn test_custom_thresholds() {
        let updater = MasteryUpdater::with_thresholds(MasteryThresholds {
            excellent: 0.95,
            good: 0.80,
            adequate: 0.60,
            good_plateau: 2,
        });
        assert_eq!(updater.update(2, 0.9).unwrap().value(), 2);
        assert_eq!(updater.update(1, 0.9).unwrap().value(), 2);
        assert_eq!(updater.update(3, 0.55).unwrap().value(), 2);
    }

    #[test]
    fn test_thresholds_validate() {
        assert!(MasteryThresholds::default().validate().is_ok());
        let inverted = MasteryThresholds {
            excellent: 0.5,
            good: 0.7,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
