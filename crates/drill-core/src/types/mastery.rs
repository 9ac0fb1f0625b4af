//! The 0-5 mastery scale.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DrillError, DrillResult};

/// Integer estimate of a learner's command of a drill's concept.
///
/// | Level | Meaning |
/// |-------|---------|
/// | 0 | unseen |
/// | 1 | exposed |
/// | 2 | basic recall |
/// | 3 | clear explanation |
/// | 4 | applied understanding |
/// | 5 | confident / consistent |
///
/// The value is always within 0-5; construction from anything else fails
/// with [`DrillError::InvalidMastery`] rather than clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Mastery(u8);

impl Mastery {
    /// Never attempted.
    pub const UNSEEN: Mastery = Mastery(0);
    /// Attempted at least once.
    pub const EXPOSED: Mastery = Mastery(1);
    /// Can recall the basics; the top of the "still needs practice" band.
    pub const BASIC_RECALL: Mastery = Mastery(2);
    /// Highest level on the scale.
    pub const MAX: Mastery = Mastery(5);

    /// Create a mastery level, rejecting values outside 0-5.
    pub fn new(value: i64) -> DrillResult<Self> {
        if (0..=Self::MAX.0 as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DrillError::InvalidMastery { value })
        }
    }

    /// Raw level.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this is the "never attempted" level.
    pub fn is_unseen(self) -> bool {
        self == Self::UNSEEN
    }

    /// One level up, saturating at [`Mastery::MAX`].
    pub fn promoted(self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }

    /// One level down, floored at [`Mastery::EXPOSED`].
    ///
    /// Once exposed, a drill never returns to unseen.
    pub fn demoted(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::EXPOSED.0))
    }

    /// Human-readable name of the level.
    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "unseen",
            1 => "exposed",
            2 => "basic recall",
            3 => "clear explanation",
            4 => "applied understanding",
            _ => "confident",
        }
    }
}

impl TryFrom<i64> for Mastery {
    type Error = DrillError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Mastery> for u8 {
    fn from(mastery: Mastery) -> Self {
        mastery.0
    }
}

impl fmt::Display for Mastery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_scale() {
        for value in 0..=5 {
            assert_eq!(Mastery::new(value).unwrap().value() as i64, value);
        }
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(
            Mastery::new(6),
            Err(DrillError::InvalidMastery { value: 6 })
        ));
        assert!(matches!(
            Mastery::new(-1),
            Err(DrillError::InvalidMastery { value: -1 })
        ));
    }

    #[test]
    fn test_promoted_saturates() {
        assert_eq!(Mastery::new(4).unwrap().promoted(), Mastery::MAX);
        assert_eq!(Mastery::MAX.promoted(), Mastery::MAX);
    }

    #[test]
    fn test_demoted_floors_at_exposed() {
        assert_eq!(Mastery::new(3).unwrap().demoted().value(), 2);
        assert_eq!(Mastery::EXPOSED.demoted(), Mastery::EXPOSED);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: Mastery = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Mastery>("9").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "4");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Mastery::UNSEEN.label(), "unseen");
        assert_eq!(Mastery::MAX.label(), "confident");
    }
}
