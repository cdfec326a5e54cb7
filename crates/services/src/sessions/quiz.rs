use rand::Rng;
use rand::seq::SliceRandom;

use study_core::{
    StateError, StudyState,
    model::{QuizQuestion, QuizType, SubjectId, score_answers},
};

use crate::error::SessionError;

/// A question the student got wrong, with what they answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncorrectAnswer {
    pub index: usize,
    pub question: QuizQuestion,
    pub given: Vec<String>,
}

/// Final result of a quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub score: u8,
    pub correct: usize,
    pub total: usize,
    pub incorrect: Vec<IncorrectAnswer>,
}

/// One attempt at a subject's quiz of a single type.
#[derive(Debug, Clone)]
pub struct QuizSession {
    subject: SubjectId,
    quiz_type: QuizType,
    questions: Vec<QuizQuestion>,
    answers: Vec<Vec<String>>,
    current: usize,
    result: Option<QuizResult>,
}

impl QuizSession {
    /// Start a quiz from the subject's stored question set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the subject has no questions of this
    /// type, or a wrapped `StateError::SubjectNotFound`.
    pub fn start(
        state: &StudyState,
        subject: SubjectId,
        quiz_type: QuizType,
    ) -> Result<Self, SessionError> {
        let s = state
            .subject(subject)
            .ok_or_else(|| SessionError::Study(StateError::SubjectNotFound(subject).into()))?;
        let questions = s.quizzes.get(&quiz_type).cloned().unwrap_or_default();
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let answers = vec![Vec::new(); questions.len()];
        Ok(Self {
            subject,
            quiz_type,
            questions,
            answers,
            current: 0,
            result: None,
        })
    }

    /// Shuffle multiple-choice options. True/false keeps its fixed order.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        if self.quiz_type == QuizType::MultipleChoice {
            for question in &mut self.questions {
                question.options.shuffle(rng);
            }
        }
        self
    }

    #[must_use]
    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    #[must_use]
    pub fn quiz_type(&self) -> QuizType {
        self.quiz_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Answer selected so far for the current question.
    #[must_use]
    pub fn current_answer(&self) -> &[String] {
        self.answers.get(self.current).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Select an answer for the current question.
    ///
    /// Multiple choice toggles the option in or out of the selection; the
    /// other quiz types replace it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the quiz is finished.
    pub fn select(&mut self, answer: &str) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::Completed);
        }
        let slot = self
            .answers
            .get_mut(self.current)
            .ok_or(SessionError::Completed)?;
        self.quiz_type.select(slot, answer);
        Ok(())
    }

    /// Move to the next question. Returns `false` when already on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unanswered` if nothing is selected for the
    /// current question, `SessionError::Completed` once finished.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Completed);
        }
        if self.current_answer().is_empty() {
            return Err(SessionError::Unanswered);
        }
        if self.is_last() {
            return Ok(false);
        }
        self.current += 1;
        Ok(true)
    }

    /// Grade every question and lock the session.
    pub(crate) fn finish(&mut self) -> Result<&QuizResult, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Completed);
        }

        let incorrect: Vec<IncorrectAnswer> = self
            .questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .filter(|(_, (q, given))| !q.is_correct(given))
            .map(|(index, (q, given))| IncorrectAnswer {
                index,
                question: q.clone(),
                given: given.clone(),
            })
            .collect();

        let total = self.questions.len();
        let result = QuizResult {
            score: score_answers(&self.questions, &self.answers),
            correct: total - incorrect.len(),
            total,
            incorrect,
        };
        Ok(&*self.result.insert(result))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use study_core::StudyEvent;
    use study_core::model::{NewSubject, QuizSets, SubjectDifficulty};
    use study_core::time::fixed_now;

    fn q(question: &str, options: &[&str], correct: &[&str]) -> QuizQuestion {
        QuizQuestion {
            question: question.into(),
            options: options.iter().map(|s| (*s).to_string()).collect(),
            correct_answer: correct.iter().map(|s| (*s).to_string()).collect(),
            explanation: String::new(),
        }
    }

    fn state() -> (StudyState, SubjectId) {
        let mut state = StudyState::default();
        state
            .apply(
                StudyEvent::AddSubject(NewSubject::new("Chemistry", SubjectDifficulty::Medium)),
                fixed_now(),
            )
            .unwrap();
        let id = state.subjects[0].id;
        let mut quizzes = QuizSets::new();
        quizzes.insert(
            QuizType::MultipleChoice,
            vec![
                q("Noble gases?", &["He", "Ne", "O", "N"], &["He", "Ne"]),
                q("Alkali metal?", &["Na", "Cl", "Fe", "C"], &["Na"]),
            ],
        );
        quizzes.insert(
            QuizType::FillInTheBlank,
            vec![
                q("H2O is ___", &[], &["Water"]),
                q("NaCl is ___", &[], &["salt"]),
                q("CO2 is ___", &[], &["carbon dioxide"]),
            ],
        );
        state
            .apply(StudyEvent::SetQuizzes { subject: id, quizzes }, fixed_now())
            .unwrap();
        (state, id)
    }

    #[test]
    fn missing_quiz_type_is_empty() {
        let (state, id) = state();
        let err = QuizSession::start(&state, id, QuizType::TrueFalse).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn multiple_choice_toggles_and_grades_unordered() {
        let (state, id) = state();
        let mut quiz = QuizSession::start(&state, id, QuizType::MultipleChoice).unwrap();

        quiz.select("Ne").unwrap();
        quiz.select("O").unwrap();
        quiz.select("O").unwrap();
        quiz.select("He").unwrap();
        assert_eq!(quiz.current_answer(), ["Ne", "He"]);
        assert!(quiz.advance().unwrap());

        quiz.select("Cl").unwrap();
        assert!(!quiz.advance().unwrap());

        let result = quiz.finish().unwrap().clone();
        assert_eq!(result.score, 50);
        assert_eq!(result.correct, 1);
        assert_eq!(result.incorrect.len(), 1);
        assert_eq!(result.incorrect[0].index, 1);
        assert_eq!(result.incorrect[0].given, vec!["Cl".to_string()]);
        assert!(quiz.is_finished());
        assert!(matches!(quiz.select("Na"), Err(SessionError::Completed)));
    }

    #[test]
    fn fill_in_the_blank_replaces_and_ignores_case() {
        let (state, id) = state();
        let mut quiz = QuizSession::start(&state, id, QuizType::FillInTheBlank).unwrap();

        quiz.select("ice").unwrap();
        quiz.select("  water ").unwrap();
        assert_eq!(quiz.current_answer().len(), 1);
        quiz.advance().unwrap();
        quiz.select("SALT").unwrap();
        quiz.advance().unwrap();
        quiz.select("methane").unwrap();

        let result = quiz.finish().unwrap();
        assert_eq!(result.score, 67);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn cannot_advance_without_answer() {
        let (state, id) = state();
        let mut quiz = QuizSession::start(&state, id, QuizType::FillInTheBlank).unwrap();
        assert!(matches!(quiz.advance(), Err(SessionError::Unanswered)));
        assert_eq!(quiz.position(), 0);
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let (state, id) = state();
        let mut quiz = QuizSession::start(&state, id, QuizType::FillInTheBlank).unwrap();
        let result = quiz.finish().unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.incorrect.len(), 3);
    }

    #[test]
    fn shuffle_keeps_the_same_options() {
        let (state, id) = state();
        let mut rng = StdRng::seed_from_u64(7);
        let quiz = QuizSession::start(&state, id, QuizType::MultipleChoice)
            .unwrap()
            .shuffled(&mut rng);
        let mut options = quiz.current_question().unwrap().options.clone();
        options.sort();
        assert_eq!(options, vec!["He", "N", "Ne", "O"]);
    }
}
