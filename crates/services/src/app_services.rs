use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::content_service::ContentService;
use crate::error::AppServicesError;
use crate::generation::{ContentGenerator, HttpContentGenerator};
use crate::study_service::StudyService;

/// Assembles the app-facing services for one user.
pub struct AppServices {
    study: StudyService,
    content: ContentService,
    generation_enabled: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, with content generation
    /// configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading the
    /// user's snapshot fails.
    pub async fn new_sqlite(
        db_url: &str,
        user_id: &str,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let generator = HttpContentGenerator::from_env();
        let generation_enabled = generator.enabled();
        Self::with_storage(storage, user_id, clock, Arc::new(generator), generation_enabled).await
    }

    /// Build services over an existing storage and generator.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the user's snapshot cannot be loaded.
    pub async fn with_storage(
        storage: Storage,
        user_id: &str,
        clock: Clock,
        generator: Arc<dyn ContentGenerator>,
        generation_enabled: bool,
    ) -> Result<Self, AppServicesError> {
        let study = StudyService::load(user_id, Arc::clone(&storage.user_data))
            .await?
            .with_clock(clock);
        tracing::info!(
            user = user_id,
            subjects = study.state().subjects.len(),
            generation_enabled,
            "services ready"
        );
        Ok(Self {
            study,
            content: ContentService::new(generator),
            generation_enabled,
        })
    }

    #[must_use]
    pub fn study(&self) -> &StudyService {
        &self.study
    }

    pub fn study_mut(&mut self) -> &mut StudyService {
        &mut self.study
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.content
    }

    /// Split borrow for generating content into the study state.
    pub fn content_and_study(&mut self) -> (&ContentService, &mut StudyService) {
        (&self.content, &mut self.study)
    }

    #[must_use]
    pub fn generation_enabled(&self) -> bool {
        self.generation_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::StudyEvent;
    use study_core::model::{NewSubject, SubjectDifficulty};
    use study_core::time::fixed_now;

    #[tokio::test]
    async fn services_reload_persisted_state() {
        let storage = Storage::in_memory();
        let generator: Arc<dyn ContentGenerator> = Arc::new(HttpContentGenerator::new(None));

        let mut app = AppServices::with_storage(
            storage.clone(),
            "me",
            Clock::fixed(fixed_now()),
            Arc::clone(&generator),
            false,
        )
        .await
        .unwrap();
        app.study_mut()
            .dispatch(StudyEvent::AddSubject(NewSubject::new(
                "Music",
                SubjectDifficulty::Easy,
            )))
            .await
            .unwrap();

        let reloaded =
            AppServices::with_storage(storage, "me", Clock::fixed(fixed_now()), generator, false)
                .await
                .unwrap();
        assert_eq!(reloaded.study().state().subjects[0].name, "Music");
        assert!(!reloaded.generation_enabled());
    }
}
