//! Per-subject readiness score.
//!
//! The score is a rough 0-100 mastery estimate. Generation milestones and
//! finished study sessions push it up; editing or clearing material resets it
//! to a fixed baseline.

use serde::{Deserialize, Serialize};

/// Upper bound of the score.
pub const MAX_SCORE: u8 = 100;
/// Value a subject falls back to when its material changes or is cleared.
pub const MATERIAL_BASELINE: u8 = 25;

pub const SUMMARY_BONUS: u8 = 10;
pub const FLASHCARDS_GENERATED_BONUS: u8 = 15;
pub const QUIZZES_GENERATED_BONUS: u8 = 15;
pub const FLASHCARD_SESSION_BONUS: u8 = 25;
pub const QUIZ_PASSED_BONUS: u8 = 25;
pub const QUIZ_ATTEMPTED_BONUS: u8 = 10;
/// A quiz must score strictly above this to earn the larger bonus.
pub const QUIZ_PASS_THRESHOLD: u8 = 60;

/// Clamped 0-100 readiness score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct ReadinessScore(u8);

impl ReadinessScore {
    pub const ZERO: ReadinessScore = ReadinessScore(0);

    /// Builds a score, clamping anything above 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(MAX_SCORE))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Adds `delta`, saturating at 100.
    #[must_use]
    pub fn add(self, delta: u8) -> Self {
        Self::new(self.0.saturating_add(delta))
    }
}

impl From<u8> for ReadinessScore {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<ReadinessScore> for u8 {
    fn from(score: ReadinessScore) -> Self {
        score.0
    }
}

/// Things that move a subject's readiness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessEvent {
    MaterialChanged,
    SummaryGenerated,
    FlashcardsGenerated,
    QuizzesGenerated,
    FlashcardSessionCompleted,
    QuizCompleted { score: u8 },
    ContentCleared,
    /// Manual adjustment by an arbitrary non-negative delta.
    Bonus(u8),
}

/// Bonus awarded for finishing a quiz with the given percentage.
#[must_use]
pub fn quiz_bonus(score: u8) -> u8 {
    if score > QUIZ_PASS_THRESHOLD {
        QUIZ_PASSED_BONUS
    } else {
        QUIZ_ATTEMPTED_BONUS
    }
}

/// Applies one event to a score.
#[must_use]
pub fn apply(current: ReadinessScore, event: ReadinessEvent) -> ReadinessScore {
    match event {
        ReadinessEvent::MaterialChanged | ReadinessEvent::ContentCleared => {
            ReadinessScore::new(MATERIAL_BASELINE)
        }
        ReadinessEvent::SummaryGenerated => current.add(SUMMARY_BONUS),
        ReadinessEvent::FlashcardsGenerated => current.add(FLASHCARDS_GENERATED_BONUS),
        ReadinessEvent::QuizzesGenerated => current.add(QUIZZES_GENERATED_BONUS),
        ReadinessEvent::FlashcardSessionCompleted => current.add(FLASHCARD_SESSION_BONUS),
        ReadinessEvent::QuizCompleted { score } => current.add(quiz_bonus(score)),
        ReadinessEvent::Bonus(delta) => current.add(delta),
    }
}
