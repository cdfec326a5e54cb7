use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::CardId;
use crate::time::start_of_day;

//
// ─── CONSTANTS ─────────────────────────────────────────────────────────────────
//

/// Easiness factor assigned to freshly generated cards.
pub const INITIAL_EASINESS: f64 = 2.5;
/// Lower bound for the easiness factor.
pub const MIN_EASINESS: f64 = 1.3;

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Term/definition pair as returned by content generation, before scheduling
/// fields are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDraft {
    pub term: String,
    pub definition: String,
}

impl FlashcardDraft {
    #[must_use]
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }

    /// Turns the draft into a new card that is due at the start of `now`'s day.
    #[must_use]
    pub fn into_card(self, id: CardId, now: DateTime<Utc>) -> Flashcard {
        Flashcard {
            id,
            term: self.term,
            definition: self.definition,
            easiness_factor: INITIAL_EASINESS,
            interval: 0,
            repetitions: 0,
            due_date: start_of_day(now),
        }
    }
}

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A flashcard together with its SM-2 memory state.
///
/// `term` and `definition` are fixed at generation; the scheduling fields are
/// only ever replaced by `scheduler::review_card`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: CardId,
    pub term: String,
    pub definition: String,
    pub easiness_factor: f64,
    /// Days until the next review; 0 until the first review.
    pub interval: u32,
    /// Consecutive successful reviews.
    pub repetitions: u32,
    pub due_date: DateTime<Utc>,
}

impl Flashcard {
    /// A card is due once its due date is at or before the start of the
    /// current UTC day.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= start_of_day(now)
    }

    /// Easiness factor with the lower bound enforced.
    ///
    /// Persisted or hand-built cards may carry a value below the bound (or a
    /// NaN); those are treated as the minimum instead of being rejected.
    #[must_use]
    pub fn effective_easiness(&self) -> f64 {
        if self.easiness_factor.is_nan() {
            return MIN_EASINESS;
        }
        self.easiness_factor.max(MIN_EASINESS)
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.repetitions == 0 && self.interval == 0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
