use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::flashcard::Flashcard;
use crate::model::ids::{CardId, FileId, SubjectId};
use crate::model::progress::ProgressEvent;
use crate::model::quiz::QuizSets;
use crate::readiness::ReadinessScore;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectDifficulty {
    Easy,
    Medium,
    Hard,
}

//
// ─── FILES ─────────────────────────────────────────────────────────────────────
//

/// Study file attached to a subject.
///
/// `data` holds the base64 payload while the file is in memory; it is
/// stripped before the state is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectFile {
    pub id: FileId,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl SubjectFile {
    /// Copy of the file metadata without its payload.
    #[must_use]
    pub fn without_data(&self) -> Self {
        Self {
            data: String::new(),
            ..self.clone()
        }
    }
}

//
// ─── NEW SUBJECT ───────────────────────────────────────────────────────────────
//

/// User input for a subject before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub difficulty: SubjectDifficulty,
    pub exam_date: Option<NaiveDate>,
}

impl NewSubject {
    #[must_use]
    pub fn new(name: impl Into<String>, difficulty: SubjectDifficulty) -> Self {
        Self {
            name: name.into(),
            difficulty,
            exam_date: None,
        }
    }

    #[must_use]
    pub fn with_exam_date(mut self, date: NaiveDate) -> Self {
        self.exam_date = Some(date);
        self
    }

    /// Validates the name and assigns an id.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if the trimmed name is empty.
    pub fn build(self, id: SubjectId) -> Result<Subject, SubjectError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SubjectError::EmptyName);
        }
        Ok(Subject {
            id,
            name: name.to_owned(),
            difficulty: self.difficulty,
            exam_date: self.exam_date,
            files: Vec::new(),
            material: String::new(),
            summary: None,
            flashcards: Vec::new(),
            quizzes: QuizSets::new(),
            readiness_score: ReadinessScore::ZERO,
            progress: Vec::new(),
        })
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A course the student is preparing for, with all material generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub difficulty: SubjectDifficulty,
    pub exam_date: Option<NaiveDate>,
    pub files: Vec<SubjectFile>,
    pub material: String,
    pub summary: Option<String>,
    pub flashcards: Vec<Flashcard>,
    pub quizzes: QuizSets,
    pub readiness_score: ReadinessScore,
    pub progress: Vec<ProgressEvent>,
}

impl Subject {
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&Flashcard> {
        self.flashcards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Flashcard> {
        self.flashcards.iter_mut().find(|c| c.id == id)
    }

    /// Cards eligible for review at `now`, in stored order.
    #[must_use]
    pub fn due_cards(&self, now: DateTime<Utc>) -> Vec<&Flashcard> {
        self.flashcards.iter().filter(|c| c.is_due(now)).collect()
    }

    #[must_use]
    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        self.flashcards.iter().filter(|c| c.is_due(now)).count()
    }

    /// Whether there is anything to generate content from.
    #[must_use]
    pub fn has_material(&self) -> bool {
        !self.material.trim().is_empty() || !self.files.is_empty()
    }

    #[must_use]
    pub fn has_quizzes(&self) -> bool {
        self.quizzes.values().any(|qs| !qs.is_empty())
    }

    /// Calendar days until the exam, negative once it has passed.
    #[must_use]
    pub fn days_until_exam(&self, now: DateTime<Utc>) -> Option<i64> {
        self.exam_date
            .map(|date| (date - now.date_naive()).num_days())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
