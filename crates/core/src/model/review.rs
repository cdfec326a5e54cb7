use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur during review operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("invalid recall quality: {0} (expected 0-5)")]
    InvalidQuality(u8),
}

//
// ─── QUALITY ──────────────────────────────────────────────────────────────────
//

/// Recall quality on the SM-2 0-5 scale.
///
/// 0-2 are failures, 3 is correct with effort, 4 correct, 5 perfect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;
    /// Lowest quality that still counts as a successful recall.
    pub const PASSING: u8 = 3;

    /// Validates a raw 0-5 rating.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidQuality` if the value is above 5.
    pub fn new(value: u8) -> Result<Self, ReviewError> {
        if value > Self::MAX {
            return Err(ReviewError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<u8> for Quality {
    type Error = ReviewError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

//
// ─── REVIEW BUTTON ────────────────────────────────────────────────────────────
//

/// The three answer buttons shown during a flashcard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewButton {
    /// Forgot the card.
    Again,
    /// Recalled it with some effort.
    Good,
    /// Recalled it instantly.
    Easy,
}

impl ReviewButton {
    pub const ALL: [ReviewButton; 3] =
        [ReviewButton::Again, ReviewButton::Good, ReviewButton::Easy];

    /// Maps the button to the quality it submits (1, 3 or 5).
    #[must_use]
    pub fn quality(self) -> Quality {
        match self {
            ReviewButton::Again => Quality(1),
            ReviewButton::Good => Quality(3),
            ReviewButton::Easy => Quality(5),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewButton::Again => "again",
            ReviewButton::Good => "good",
            ReviewButton::Easy => "easy",
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_quality_conversion_works() {
        assert_eq!(Quality::new(0).unwrap().value(), 0);
        assert_eq!(Quality::new(5).unwrap().value(), 5);
        let err = Quality::new(6).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidQuality(6)));
    }

    #[test]
    fn three_is_the_success_boundary() {
        assert!(!Quality::new(2).unwrap().is_success());
        assert!(Quality::new(3).unwrap().is_success());
    }

    #[test]
    fn buttons_map_to_one_three_five() {
        assert_eq!(ReviewButton::Again.quality().value(), 1);
        assert_eq!(ReviewButton::Good.quality().value(), 3);
        assert_eq!(ReviewButton::Easy.quality().value(), 5);
    }

    #[test]
    fn quality_deserialization_rejects_out_of_range() {
        assert!(serde_json::from_str::<Quality>("4").is_ok());
        assert!(serde_json::from_str::<Quality>("9").is_err());
    }
}
