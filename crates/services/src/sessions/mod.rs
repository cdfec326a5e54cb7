mod flashcard;
mod quiz;
mod workflow;

pub use crate::error::SessionError;
pub use flashcard::{CardAnswer, FlashcardSession, SessionProgress};
pub use quiz::{IncorrectAnswer, QuizResult, QuizSession};
pub use workflow::FlashcardStep;
