use study_core::{
    StudyEvent,
    model::{QuizType, ReviewButton, SubjectId},
};

use super::flashcard::{CardAnswer, FlashcardSession};
use super::quiz::{QuizResult, QuizSession};
use crate::error::SessionError;
use crate::study_service::StudyService;

/// Result of answering a single card in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashcardStep {
    pub answer: CardAnswer,
    pub is_complete: bool,
}

impl StudyService {
    /// Start a review pass over the subject's due cards.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when nothing is due, or a wrapped
    /// state error for an unknown subject.
    pub fn start_flashcard_session(
        &self,
        subject: SubjectId,
    ) -> Result<FlashcardSession, SessionError> {
        let session = FlashcardSession::start(self.state(), subject, self.now())?;
        tracing::info!(
            subject = %subject,
            cards = session.total_cards(),
            "flashcard session started"
        );
        Ok(session)
    }

    /// Answer the current card, persisting the review. On the last card the
    /// session completion is recorded as well.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is finished,
    /// `SessionError::SubjectMismatch` if the session belongs to another
    /// subject's state, or wrapped state/storage errors.
    pub async fn answer_flashcard(
        &mut self,
        session: &mut FlashcardSession,
        button: ReviewButton,
    ) -> Result<FlashcardStep, SessionError> {
        let subject = session.subject();
        if self.state().subject(subject).is_none() {
            return Err(SessionError::SubjectMismatch);
        }
        let card = session.current_id()?;

        self.dispatch(StudyEvent::ReviewFlashcard {
            subject,
            card,
            quality: button.quality().value(),
        })
        .await?;

        let reviewed = self
            .state()
            .subject(subject)
            .and_then(|s| s.card(card))
            .cloned()
            .ok_or_else(|| session.missing_card(card))?;
        let answer = session.record(button, &reviewed, self.now())?;
        tracing::debug!(
            card = %card,
            button = button.as_str(),
            interval = answer.interval,
            "card reviewed"
        );

        if session.is_complete() {
            let cards_reviewed = u32::try_from(session.total_cards()).unwrap_or(u32::MAX);
            self.dispatch(StudyEvent::CompleteFlashcardSession {
                subject,
                cards_reviewed,
            })
            .await?;
            tracing::info!(subject = %subject, cards_reviewed, "flashcard session completed");
        }

        Ok(FlashcardStep {
            answer,
            is_complete: session.is_complete(),
        })
    }

    /// Start a quiz over one of the subject's question sets.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if there are no questions of that type.
    pub fn start_quiz(
        &self,
        subject: SubjectId,
        quiz_type: QuizType,
    ) -> Result<QuizSession, SessionError> {
        let session = QuizSession::start(self.state(), subject, quiz_type)?;
        Ok(session.shuffled(&mut rand::rng()))
    }

    /// Grade the quiz and record the score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the quiz was already finished, or
    /// wrapped state/storage errors from recording the score. The quiz stays
    /// graded even if recording fails.
    pub async fn finish_quiz(
        &mut self,
        session: &mut QuizSession,
    ) -> Result<QuizResult, SessionError> {
        let result = session.finish()?.clone();
        self.dispatch(StudyEvent::CompleteQuiz {
            subject: session.subject(),
            score: result.score,
        })
        .await?;
        tracing::info!(
            subject = %session.subject(),
            quiz = session.quiz_type().as_str(),
            score = result.score,
            "quiz completed"
        );
        Ok(result)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
