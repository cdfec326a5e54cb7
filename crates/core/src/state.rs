//! The per-user study state and the events that change it.
//!
//! All mutation goes through [`StudyState::apply`]. Events are validated
//! before anything is touched, so a failed event leaves the state as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    CardId, FileId, Flashcard, FlashcardDraft, NewSubject, ProgressEvent, Quality, QuizSets,
    ReviewError, StudyIntensity, Subject, SubjectError, SubjectFile, SubjectId, UserProfile,
};
use crate::readiness::{self, MAX_SCORE, ReadinessEvent};
use crate::scheduler;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    #[error("subject not found: {0}")]
    SubjectNotFound(SubjectId),

    #[error("flashcard {card} not found in subject {subject}")]
    CardNotFound { subject: SubjectId, card: CardId },

    #[error("quiz score must be 0-100, got {0}")]
    InvalidQuizScore(u8),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Subject(#[from] SubjectError),
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Every state change the application can make.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyEvent {
    CompleteOnboarding {
        profile: UserProfile,
        subjects: Vec<NewSubject>,
        intensity: StudyIntensity,
    },
    AddSubject(NewSubject),
    UpdateMaterial {
        subject: SubjectId,
        material: String,
    },
    SetSummary {
        subject: SubjectId,
        summary: String,
    },
    SetFlashcards {
        subject: SubjectId,
        cards: Vec<FlashcardDraft>,
    },
    SetQuizzes {
        subject: SubjectId,
        quizzes: QuizSets,
    },
    AddFile {
        subject: SubjectId,
        file: SubjectFile,
    },
    RemoveFile {
        subject: SubjectId,
        file: FileId,
    },
    ClearContent {
        subject: SubjectId,
    },
    /// Raw 0-5 rating; validated when applied.
    ReviewFlashcard {
        subject: SubjectId,
        card: CardId,
        quality: u8,
    },
    CompleteFlashcardSession {
        subject: SubjectId,
        cards_reviewed: u32,
    },
    CompleteQuiz {
        subject: SubjectId,
        score: u8,
    },
    UpdateReadiness {
        subject: SubjectId,
        delta: u8,
    },
    UpdateProfile {
        profile: UserProfile,
        intensity: StudyIntensity,
        notifications_enabled: bool,
    },
    Reset,
}

impl StudyEvent {
    /// Short stable name, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StudyEvent::CompleteOnboarding { .. } => "complete_onboarding",
            StudyEvent::AddSubject(_) => "add_subject",
            StudyEvent::UpdateMaterial { .. } => "update_material",
            StudyEvent::SetSummary { .. } => "set_summary",
            StudyEvent::SetFlashcards { .. } => "set_flashcards",
            StudyEvent::SetQuizzes { .. } => "set_quizzes",
            StudyEvent::AddFile { .. } => "add_file",
            StudyEvent::RemoveFile { .. } => "remove_file",
            StudyEvent::ClearContent { .. } => "clear_content",
            StudyEvent::ReviewFlashcard { .. } => "review_flashcard",
            StudyEvent::CompleteFlashcardSession { .. } => "complete_flashcard_session",
            StudyEvent::CompleteQuiz { .. } => "complete_quiz",
            StudyEvent::UpdateReadiness { .. } => "update_readiness",
            StudyEvent::UpdateProfile { .. } => "update_profile",
            StudyEvent::Reset => "reset",
        }
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Everything stored for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyState {
    pub profile: Option<UserProfile>,
    pub study_intensity: Option<StudyIntensity>,
    pub subjects: Vec<Subject>,
    pub notifications_enabled: bool,
}

impl Default for StudyState {
    fn default() -> Self {
        Self {
            profile: None,
            study_intensity: None,
            subjects: Vec::new(),
            notifications_enabled: true,
        }
    }
}

impl StudyState {
    #[must_use]
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    fn subject_mut(&mut self, id: SubjectId) -> Result<&mut Subject, StateError> {
        self.subjects
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StateError::SubjectNotFound(id))
    }

    #[must_use]
    pub fn is_onboarded(&self) -> bool {
        self.profile.is_some()
    }

    /// Cards due for `subject` at `now`; empty (not an error) when nothing is due.
    ///
    /// # Errors
    ///
    /// Returns `StateError::SubjectNotFound` for an unknown subject.
    pub fn due_cards(
        &self,
        subject: SubjectId,
        now: DateTime<Utc>,
    ) -> Result<Vec<&Flashcard>, StateError> {
        self.subject(subject)
            .map(|s| s.due_cards(now))
            .ok_or(StateError::SubjectNotFound(subject))
    }

    /// Copy of the state with file payloads removed, ready to persist.
    #[must_use]
    pub fn for_storage(&self) -> Self {
        let mut copy = self.clone();
        for subject in &mut copy.subjects {
            subject.files = subject.files.iter().map(SubjectFile::without_data).collect();
        }
        copy
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns `StateError` for unknown subjects or cards, an out-of-range
    /// quality or quiz score, or an empty subject name. The state is left
    /// unchanged in that case.
    pub fn apply(&mut self, event: StudyEvent, now: DateTime<Utc>) -> Result<(), StateError> {
        match event {
            StudyEvent::CompleteOnboarding {
                profile,
                subjects,
                intensity,
            } => {
                let built = subjects
                    .into_iter()
                    .map(|s| s.build(SubjectId::generate()))
                    .collect::<Result<Vec<_>, _>>()?;
                self.profile = Some(profile);
                self.study_intensity = Some(intensity);
                self.subjects = built;
            }
            StudyEvent::AddSubject(new_subject) => {
                let subject = new_subject.build(SubjectId::generate())?;
                self.subjects.push(subject);
            }
            StudyEvent::UpdateMaterial { subject, material } => {
                let s = self.subject_mut(subject)?;
                s.material = material;
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::MaterialChanged);
            }
            StudyEvent::SetSummary { subject, summary } => {
                let s = self.subject_mut(subject)?;
                s.summary = Some(summary);
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::SummaryGenerated);
            }
            StudyEvent::SetFlashcards { subject, cards } => {
                let s = self.subject_mut(subject)?;
                s.flashcards = cards
                    .into_iter()
                    .map(|draft| draft.into_card(CardId::generate(), now))
                    .collect();
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::FlashcardsGenerated);
            }
            StudyEvent::SetQuizzes { subject, quizzes } => {
                let s = self.subject_mut(subject)?;
                s.quizzes = quizzes;
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::QuizzesGenerated);
            }
            StudyEvent::AddFile { subject, file } => {
                self.subject_mut(subject)?.files.push(file);
            }
            StudyEvent::RemoveFile { subject, file } => {
                self.subject_mut(subject)?.files.retain(|f| f.id != file);
            }
            StudyEvent::ClearContent { subject } => {
                let s = self.subject_mut(subject)?;
                s.summary = None;
                s.flashcards.clear();
                s.quizzes.clear();
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::ContentCleared);
            }
            StudyEvent::ReviewFlashcard {
                subject,
                card,
                quality,
            } => {
                let quality = Quality::new(quality)?;
                let s = self.subject_mut(subject)?;
                let current = s
                    .card_mut(card)
                    .ok_or(StateError::CardNotFound { subject, card })?;
                *current = scheduler::review_card(current, quality, now);
            }
            StudyEvent::CompleteFlashcardSession {
                subject,
                cards_reviewed,
            } => {
                let s = self.subject_mut(subject)?;
                s.readiness_score = readiness::apply(
                    s.readiness_score,
                    ReadinessEvent::FlashcardSessionCompleted,
                );
                s.progress.push(ProgressEvent::Flashcards {
                    date: now,
                    cards_reviewed,
                });
            }
            StudyEvent::CompleteQuiz { subject, score } => {
                if score > MAX_SCORE {
                    return Err(StateError::InvalidQuizScore(score));
                }
                let s = self.subject_mut(subject)?;
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::QuizCompleted { score });
                s.progress.push(ProgressEvent::Quiz { date: now, score });
            }
            StudyEvent::UpdateReadiness { subject, delta } => {
                let s = self.subject_mut(subject)?;
                s.readiness_score =
                    readiness::apply(s.readiness_score, ReadinessEvent::Bonus(delta));
            }
            StudyEvent::UpdateProfile {
                profile,
                intensity,
                notifications_enabled,
            } => {
                self.profile = Some(profile);
                self.study_intensity = Some(intensity);
                self.notifications_enabled = notifications_enabled;
            }
            StudyEvent::Reset => *self = Self::default(),
        }
        Ok(())
    }
}

/// Functional form of [`StudyState::apply`]: returns the next state and leaves
/// the input alone.
///
/// # Errors
///
/// Same as [`StudyState::apply`].
pub fn apply_event(
    state: &StudyState,
    event: StudyEvent,
    now: DateTime<Utc>,
) -> Result<StudyState, StateError> {
    let mut next = state.clone();
    next.apply(event, now)?;
    Ok(next)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
