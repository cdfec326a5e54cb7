//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::StateError;

/// Errors emitted by `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyServiceError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by flashcard and quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("nothing to study in this session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("current question has no answer yet")]
    Unanswered,
    #[error("session subject no longer exists")]
    SubjectMismatch,
    #[error(transparent)]
    Study(#[from] StudyServiceError),
}

/// Errors emitted by content generators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("content generation is not configured")]
    Disabled,
    #[error("study material is required to generate content")]
    MissingMaterial,
    #[error("content generator returned an empty response")]
    EmptyResponse,
    #[error("content generator returned malformed content: {0}")]
    Malformed(String),
    #[error("content generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Study(#[from] StudyServiceError),
}

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Study(#[from] StudyServiceError),
}
