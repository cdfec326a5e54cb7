use std::sync::Arc;

use study_core::{StateError, StudyEvent, model::SubjectId};

use crate::error::{ContentServiceError, StudyServiceError};
use crate::generation::{ContentGenerator, GenerationAmount, GenerationRequest};
use crate::study_service::StudyService;

/// Generates content for a subject and stores it through the study service.
#[derive(Clone)]
pub struct ContentService {
    generator: Arc<dyn ContentGenerator>,
}

impl ContentService {
    #[must_use]
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    fn request(
        study: &StudyService,
        subject: SubjectId,
        amount: GenerationAmount,
        focus: &str,
    ) -> Result<GenerationRequest, ContentServiceError> {
        let s = study
            .state()
            .subject(subject)
            .ok_or(StudyServiceError::State(StateError::SubjectNotFound(subject)))?;
        Ok(GenerationRequest::for_subject(s, amount).with_focus(focus))
    }

    /// # Errors
    ///
    /// Returns `ContentServiceError` if the subject is unknown, generation
    /// fails, or the summary cannot be stored.
    pub async fn summarize(
        &self,
        study: &mut StudyService,
        subject: SubjectId,
    ) -> Result<(), ContentServiceError> {
        let request = Self::request(study, subject, GenerationAmount::Normal, "")?;
        let summary = self.generator.generate_summary(&request).await?;
        study
            .dispatch(StudyEvent::SetSummary { subject, summary })
            .await?;
        Ok(())
    }

    /// Replace the subject's flashcards with freshly generated ones.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` if the subject is unknown, generation
    /// fails, or the cards cannot be stored.
    pub async fn flashcards(
        &self,
        study: &mut StudyService,
        subject: SubjectId,
        amount: GenerationAmount,
        focus: &str,
    ) -> Result<usize, ContentServiceError> {
        let request = Self::request(study, subject, amount, focus)?;
        let cards = self.generator.generate_flashcards(&request).await?;
        let count = cards.len();
        study
            .dispatch(StudyEvent::SetFlashcards { subject, cards })
            .await?;
        tracing::info!(subject = %subject, count, "flashcards generated");
        Ok(count)
    }

    /// Replace the subject's quizzes with freshly generated ones.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` if the subject is unknown, generation
    /// fails, or the quizzes cannot be stored.
    pub async fn quizzes(
        &self,
        study: &mut StudyService,
        subject: SubjectId,
        amount: GenerationAmount,
        focus: &str,
    ) -> Result<(), ContentServiceError> {
        let request = Self::request(study, subject, amount, focus)?;
        let quizzes = self.generator.generate_quiz(&request).await?;
        study
            .dispatch(StudyEvent::SetQuizzes { subject, quizzes })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storage::repository::InMemoryRepository;
    use study_core::Clock;
    use study_core::model::{FlashcardDraft, NewSubject, QuizSets, SubjectDifficulty};
    use study_core::time::fixed_now;

    use crate::error::GenerationError;

    struct CannedGenerator;

    #[async_trait]
    impl ContentGenerator for CannedGenerator {
        async fn generate_summary(
            &self,
            request: &GenerationRequest,
        ) -> Result<String, GenerationError> {
            request.ensure_material()?;
            Ok(format!("Summary of {} chars", request.material.len()))
        }

        async fn generate_flashcards(
            &self,
            request: &GenerationRequest,
        ) -> Result<Vec<FlashcardDraft>, GenerationError> {
            request.ensure_material()?;
            Ok((0..request.amount.max_flashcards())
                .map(|i| FlashcardDraft::new(format!("term {i}"), request.focus.clone()))
                .collect())
        }

        async fn generate_quiz(
            &self,
            request: &GenerationRequest,
        ) -> Result<QuizSets, GenerationError> {
            request.ensure_material()?;
            Ok(QuizSets::new())
        }
    }

    async fn study() -> (StudyService, SubjectId) {
        let mut svc = StudyService::load("gen", Arc::new(InMemoryRepository::new()))
            .await
            .unwrap()
            .with_clock(Clock::fixed(fixed_now()));
        svc.dispatch(StudyEvent::AddSubject(NewSubject::new(
            "Biology",
            SubjectDifficulty::Medium,
        )))
        .await
        .unwrap();
        let id = svc.state().subjects[0].id;
        (svc, id)
    }

    #[tokio::test]
    async fn generation_requires_material() {
        let (mut svc, id) = study().await;
        let content = ContentService::new(Arc::new(CannedGenerator));
        let err = content.summarize(&mut svc, id).await.unwrap_err();
        assert!(matches!(
            err,
            ContentServiceError::Generation(GenerationError::MissingMaterial)
        ));
        assert!(svc.state().subject(id).unwrap().summary.is_none());
    }

    #[tokio::test]
    async fn generated_content_is_stored_with_readiness() {
        let (mut svc, id) = study().await;
        svc.dispatch(StudyEvent::UpdateMaterial {
            subject: id,
            material: "Mitochondria make ATP.".into(),
        })
        .await
        .unwrap();
        let content = ContentService::new(Arc::new(CannedGenerator));

        content.summarize(&mut svc, id).await.unwrap();
        let count = content
            .flashcards(&mut svc, id, GenerationAmount::Few, "energy")
            .await
            .unwrap();
        content
            .quizzes(&mut svc, id, GenerationAmount::Few, "")
            .await
            .unwrap();

        let subject = svc.state().subject(id).unwrap();
        assert_eq!(count, 5);
        assert_eq!(subject.flashcards.len(), 5);
        assert_eq!(subject.flashcards[0].definition, "energy");
        assert_eq!(subject.readiness_score.value(), 25 + 10 + 15 + 15);
    }

    #[tokio::test]
    async fn unknown_subject_is_reported() {
        let (mut svc, _) = study().await;
        let content = ContentService::new(Arc::new(CannedGenerator));
        let err = content
            .summarize(&mut svc, SubjectId::generate())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContentServiceError::Study(StudyServiceError::State(StateError::SubjectNotFound(_)))
        ));
    }
}
