use std::fmt;

use chrono::{DateTime, Utc};
use study_core::{
    StateError, StudyState,
    model::{CardId, Flashcard, ReviewButton, SubjectId},
    scheduler::ButtonPreviews,
};

use crate::error::SessionError;

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// One answered card within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardAnswer {
    pub card_id: CardId,
    pub button: ReviewButton,
    /// Interval, in days, the card was rescheduled to.
    pub interval: u32,
}

/// How far a session has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub answered: usize,
    pub total: usize,
}

impl SessionProgress {
    #[must_use]
    pub fn remaining(self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Review pass over the cards that were due when it started.
///
/// The card list is a snapshot; cards rescheduled during the session are
/// not re-queued.
pub struct FlashcardSession {
    subject: SubjectId,
    cards: Vec<Flashcard>,
    current: usize,
    answers: Vec<CardAnswer>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl FlashcardSession {
    /// Snapshot the due cards of `subject` at `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if nothing is due and
    /// `StateError::SubjectNotFound` (wrapped) for an unknown subject.
    pub fn start(
        state: &StudyState,
        subject: SubjectId,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let cards: Vec<Flashcard> = state
            .due_cards(subject, now)
            .map_err(|e| SessionError::Study(e.into()))?
            .into_iter()
            .cloned()
            .collect();

        if cards.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            subject,
            cards,
            current: 0,
            answers: Vec::new(),
            started_at: now,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn answers(&self) -> &[CardAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            answered: self.answers.len(),
            total: self.cards.len(),
        }
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.is_complete() {
            return None;
        }
        self.cards.get(self.current)
    }

    /// Interval previews for the card being shown.
    #[must_use]
    pub fn previews(&self) -> Option<ButtonPreviews> {
        self.current_card().map(ButtonPreviews::for_card)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Record an answer for the current card and advance.
    ///
    /// `reviewed` is the card as rescheduled by the state store.
    pub(crate) fn record(
        &mut self,
        button: ReviewButton,
        reviewed: &Flashcard,
        at: DateTime<Utc>,
    ) -> Result<CardAnswer, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }

        let answer = CardAnswer {
            card_id: reviewed.id,
            button,
            interval: reviewed.interval,
        };
        self.answers.push(answer);
        if let Some(slot) = self.cards.get_mut(self.current) {
            *slot = reviewed.clone();
        }

        self.current += 1;
        if self.current >= self.cards.len() {
            self.completed_at = Some(at);
        }
        Ok(answer)
    }

    pub(crate) fn current_id(&self) -> Result<CardId, SessionError> {
        self.current_card()
            .map(|c| c.id)
            .ok_or(SessionError::Completed)
    }

    pub(crate) fn missing_card(&self, card: CardId) -> SessionError {
        SessionError::Study(
            StateError::CardNotFound {
                subject: self.subject,
                card,
            }
            .into(),
        )
    }
}

impl fmt::Debug for FlashcardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashcardSession")
            .field("subject", &self.subject)
            .field("cards_len", &self.cards.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
