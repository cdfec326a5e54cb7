use std::fmt;

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Flashcard, MIN_EASINESS, Quality, ReviewButton};

/// Interval after a failed review and after the first success.
const FIRST_INTERVAL_DAYS: u32 = 1;
/// Interval after the second consecutive success.
const SECOND_INTERVAL_DAYS: u32 = 6;

//
// ─── MEMORY STATE ──────────────────────────────────────────────────────────────
//

/// The SM-2 fields of a card, detached from its content.
///
/// # Examples
///
/// ```
/// # use study_core::scheduler::{MemoryState, next_memory};
/// # use study_core::model::Quality;
/// let state = MemoryState { easiness_factor: 2.5, interval: 6, repetitions: 2 };
/// let next = next_memory(&state, Quality::new(4)?);
/// assert_eq!(next.interval, 15);
/// # Ok::<(), study_core::model::ReviewError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub easiness_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
}

impl MemoryState {
    #[must_use]
    pub fn of(card: &Flashcard) -> Self {
        Self {
            easiness_factor: card.effective_easiness(),
            interval: card.interval,
            repetitions: card.repetitions,
        }
    }
}

/// Computes the memory state after one review.
///
/// This is the single place the SM-2 arithmetic lives; both `review_card` and
/// the previews go through it.
///
/// - Failure (quality below 3) resets repetitions and sets the interval to one
///   day. The easiness factor is left as it was.
/// - Success updates the easiness factor (floored at 1.3), bumps repetitions,
///   and picks 1 day, 6 days, or `ceil(previous interval * new factor)`.
#[must_use]
pub fn next_memory(state: &MemoryState, quality: Quality) -> MemoryState {
    let ef = if state.easiness_factor.is_nan() {
        MIN_EASINESS
    } else {
        state.easiness_factor.max(MIN_EASINESS)
    };

    if !quality.is_success() {
        return MemoryState {
            easiness_factor: ef,
            interval: FIRST_INTERVAL_DAYS,
            repetitions: 0,
        };
    }

    let q = f64::from(quality.value());
    let new_ef = (ef + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASINESS);
    let repetitions = state.repetitions.saturating_add(1);

    let interval = match repetitions {
        1 => FIRST_INTERVAL_DAYS,
        2 => SECOND_INTERVAL_DAYS,
        _ => {
            // `as` saturates, so very old cards pin at u32::MAX days.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let days = (f64::from(state.interval) * new_ef).ceil() as u32;
            days.max(FIRST_INTERVAL_DAYS)
        }
    };

    MemoryState {
        easiness_factor: new_ef,
        interval,
        repetitions,
    }
}

/// Due date `interval` whole days after `now`, saturating at the latest
/// representable instant.
#[must_use]
pub fn due_after(now: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    now.checked_add_days(Days::new(u64::from(interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

//
// ─── REVIEW ────────────────────────────────────────────────────────────────────
//

/// Applies a review to a card and returns its new state.
///
/// Pure: the caller supplies `now` and stores the returned card.
///
/// # Examples
///
/// ```
/// # use study_core::scheduler::review_card;
/// # use study_core::model::{CardId, FlashcardDraft, Quality};
/// let now = study_core::time::fixed_now();
/// let card = FlashcardDraft::new("H2O", "Water").into_card(CardId::generate(), now);
/// let reviewed = review_card(&card, Quality::new(5)?, now);
/// assert_eq!(reviewed.repetitions, 1);
/// assert_eq!(reviewed.interval, 1);
/// # Ok::<(), study_core::model::ReviewError>(())
/// ```
#[must_use]
pub fn review_card(card: &Flashcard, quality: Quality, now: DateTime<Utc>) -> Flashcard {
    let next = next_memory(&MemoryState::of(card), quality);
    Flashcard {
        easiness_factor: next.easiness_factor,
        interval: next.interval,
        repetitions: next.repetitions,
        due_date: due_after(now, next.interval),
        ..card.clone()
    }
}

//
// ─── PREVIEW ───────────────────────────────────────────────────────────────────
//

/// Rounded, human-facing form of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalPreview {
    Days(u32),
    Months(u32),
}

impl IntervalPreview {
    /// Buckets a day count: under 30 days stays in days, otherwise months
    /// rounded to the nearest whole month.
    #[must_use]
    pub fn from_days(days: u32) -> Self {
        if days <= 1 {
            return Self::Days(1);
        }
        if days < 30 {
            return Self::Days(days);
        }
        let months = (f64::from(days) / 30.0).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let months = months as u32;
        Self::Months(months.max(1))
    }
}

impl fmt::Display for IntervalPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalPreview::Days(1) => write!(f, "≈ 1 day"),
            IntervalPreview::Days(n) => write!(f, "≈ {n} days"),
            IntervalPreview::Months(1) => write!(f, "≈ 1 month"),
            IntervalPreview::Months(n) => write!(f, "≈ {n} months"),
        }
    }
}

/// Interval a review with `quality` would produce, without touching the card.
#[must_use]
pub fn preview_interval(card: &Flashcard, quality: Quality) -> u32 {
    next_memory(&MemoryState::of(card), quality).interval
}

/// Previews for each answer button, shown before the student commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPreviews {
    pub again: u32,
    pub good: u32,
    pub easy: u32,
}

impl ButtonPreviews {
    #[must_use]
    pub fn for_card(card: &Flashcard) -> Self {
        Self {
            again: preview_interval(card, ReviewButton::Again.quality()),
            good: preview_interval(card, ReviewButton::Good.quality()),
            easy: preview_interval(card, ReviewButton::Easy.quality()),
        }
    }

    #[must_use]
    pub fn select(&self, button: ReviewButton) -> u32 {
        match button {
            ReviewButton::Again => self.again,
            ReviewButton::Good => self.good,
            ReviewButton::Easy => self.easy,
        }
    }

    #[must_use]
    pub fn label(&self, button: ReviewButton) -> IntervalPreview {
        IntervalPreview::from_days(self.select(button))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
