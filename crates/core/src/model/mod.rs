mod flashcard;
mod ids;
mod profile;
mod progress;
mod quiz;
mod review;
mod subject;

pub use ids::{CardId, FileId, ParseIdError, SubjectId};

pub use flashcard::{Flashcard, FlashcardDraft, INITIAL_EASINESS, MIN_EASINESS};
pub use profile::{StudyIntensity, UserProfile, UserProfileDraft};
pub use progress::ProgressEvent;
pub use quiz::{QuizQuestion, QuizSets, QuizType, answers_match, score_answers};
pub use review::{Quality, ReviewButton, ReviewError};
pub use subject::{NewSubject, Subject, SubjectDifficulty, SubjectError, SubjectFile};
