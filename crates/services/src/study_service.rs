use std::sync::Arc;

use chrono::{DateTime, Utc};

use storage::repository::{UserDataRecord, UserDataRepository};
use study_core::{
    Clock, StateError, StudyEvent, StudyState,
    analytics::{self, SubjectProgress},
    model::{CardId, Flashcard, SubjectId},
    scheduler::ButtonPreviews,
};

use crate::error::StudyServiceError;

//
// ─── PROFILE STATS ─────────────────────────────────────────────────────────────
//

/// Cross-subject numbers for the profile page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileStats {
    pub subjects: usize,
    pub streak_days: u32,
    pub cards_reviewed: u64,
    pub quizzes_taken: usize,
    /// Mean over every quiz taken, `None` before the first quiz.
    pub average_quiz_score: Option<f64>,
    pub most_studied: Option<SubjectId>,
    pub weakest: Option<SubjectId>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Owns one user's study state and keeps the persisted snapshot in sync.
pub struct StudyService {
    clock: Clock,
    user_id: String,
    state: StudyState,
    repo: Arc<dyn UserDataRepository>,
}

impl StudyService {
    /// Load the user's snapshot, starting from an empty state if none exists.
    ///
    /// # Errors
    ///
    /// Returns `StudyServiceError::Storage` on backend failure, an invalid
    /// user id, or a corrupt snapshot.
    pub async fn load(
        user_id: impl Into<String>,
        repo: Arc<dyn UserDataRepository>,
    ) -> Result<Self, StudyServiceError> {
        let user_id = user_id.into();
        let state = match repo.load_user_data(&user_id).await? {
            Some(record) => {
                tracing::debug!(
                    user = %user_id,
                    updated_at = %record.updated_at,
                    "loaded snapshot"
                );
                record.state
            }
            None => {
                tracing::debug!(user = %user_id, "no snapshot, starting fresh");
                StudyState::default()
            }
        };
        Ok(Self {
            clock: Clock::default(),
            user_id,
            state,
            repo,
        })
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn state(&self) -> &StudyState {
        &self.state
    }

    /// Apply an event and persist the resulting snapshot.
    ///
    /// If persistence fails, the in-memory state is rolled back to what it
    /// was before the event.
    ///
    /// # Errors
    ///
    /// Returns `StudyServiceError::State` if the event is rejected and
    /// `StudyServiceError::Storage` if the snapshot cannot be saved.
    pub async fn dispatch(&mut self, event: StudyEvent) -> Result<(), StudyServiceError> {
        let kind = event.kind();
        let now = self.now();
        let previous = self.state.clone();

        if let Err(err) = self.state.apply(event, now) {
            tracing::warn!(user = %self.user_id, event = kind, error = %err, "event rejected");
            return Err(err.into());
        }

        let saved = match UserDataRecord::from_state(&self.user_id, &self.state, now) {
            Ok(record) => self.repo.save_user_data(&record).await,
            Err(err) => Err(err),
        };

        match saved {
            Ok(()) => {
                tracing::info!(user = %self.user_id, event = kind, "event applied");
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    user = %self.user_id,
                    event = kind,
                    error = %err,
                    "snapshot not saved, rolling back"
                );
                self.state = previous;
                Err(err.into())
            }
        }
    }

    /// Next interval for each answer button on a card, without changing it.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the subject or card is unknown.
    pub fn preview(&self, subject: SubjectId, card: CardId) -> Result<ButtonPreviews, StateError> {
        let s = self
            .state
            .subject(subject)
            .ok_or(StateError::SubjectNotFound(subject))?;
        let card = s.card(card).ok_or(StateError::CardNotFound { subject, card })?;
        Ok(ButtonPreviews::for_card(card))
    }

    /// Cards due today for a subject.
    ///
    /// # Errors
    ///
    /// Returns `StateError::SubjectNotFound` for an unknown subject.
    pub fn due_cards(&self, subject: SubjectId) -> Result<Vec<&Flashcard>, StateError> {
        self.state.due_cards(subject, self.now())
    }

    /// Per-subject progress numbers.
    ///
    /// # Errors
    ///
    /// Returns `StateError::SubjectNotFound` for an unknown subject.
    pub fn progress_summary(&self, subject: SubjectId) -> Result<SubjectProgress, StateError> {
        self.state
            .subject(subject)
            .map(SubjectProgress::of)
            .ok_or(StateError::SubjectNotFound(subject))
    }

    #[must_use]
    pub fn profile_stats(&self) -> ProfileStats {
        let subjects = &self.state.subjects;
        let all_progress: Vec<_> = subjects
            .iter()
            .flat_map(|s| s.progress.iter().cloned())
            .collect();

        ProfileStats {
            subjects: subjects.len(),
            streak_days: analytics::subjects_streak(subjects, self.now()),
            cards_reviewed: analytics::total_cards_reviewed(&all_progress),
            quizzes_taken: all_progress.iter().filter(|e| e.quiz_score().is_some()).count(),
            average_quiz_score: analytics::average_quiz_score(&all_progress),
            most_studied: analytics::most_studied_subject(subjects).map(|s| s.id),
            weakest: analytics::weakest_subject(subjects).map(|s| s.id),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
