#![forbid(unsafe_code)]

pub mod app_services;
pub mod content_service;
pub mod error;
pub mod generation;
pub mod sessions;
pub mod study_service;

pub use study_core::Clock;

pub use app_services::AppServices;
pub use content_service::ContentService;
pub use error::{
    AppServicesError, ContentServiceError, GenerationError, SessionError, StudyServiceError,
};
pub use generation::{
    ContentGenerator, GenerationAmount, GenerationRequest, GeneratorConfig, HttpContentGenerator,
};
pub use sessions::{CardAnswer, FlashcardSession, FlashcardStep, QuizResult, QuizSession};
pub use study_service::{ProfileStats, StudyService};
