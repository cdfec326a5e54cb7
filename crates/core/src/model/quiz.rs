use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kinds of generated quiz, each with its own answer-entry rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuizType {
    /// One or more options may be correct; selecting toggles an option.
    MultipleChoice,
    /// Exactly one of "True"/"False".
    TrueFalse,
    /// Free text typed by the student.
    FillInTheBlank,
}

impl QuizType {
    pub const ALL: [QuizType; 3] = [
        QuizType::MultipleChoice,
        QuizType::TrueFalse,
        QuizType::FillInTheBlank,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::MultipleChoice => "multiple_choice",
            QuizType::TrueFalse => "true_false",
            QuizType::FillInTheBlank => "fill_in_the_blank",
        }
    }

    /// Applies a selection to the answers already given for one question.
    ///
    /// Multiple choice toggles the option in or out; the other kinds replace
    /// whatever was there.
    pub fn select(self, current: &mut Vec<String>, answer: &str) {
        match self {
            QuizType::MultipleChoice => {
                if let Some(pos) = current.iter().position(|a| a == answer) {
                    current.remove(pos);
                } else {
                    current.push(answer.to_owned());
                }
            }
            QuizType::TrueFalse | QuizType::FillInTheBlank => {
                current.clear();
                current.push(answer.to_owned());
            }
        }
    }
}

/// A generated question. `options` is empty for fill-in-the-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Vec<String>,
    pub explanation: String,
}

impl QuizQuestion {
    #[must_use]
    pub fn is_correct(&self, given: &[String]) -> bool {
        answers_match(given, &self.correct_answer)
    }
}

/// Generated question sets keyed by quiz type.
pub type QuizSets = BTreeMap<QuizType, Vec<QuizQuestion>>;

/// Unordered, case-insensitive comparison of two answer lists.
///
/// Both lists are sorted as given, then compared pairwise after trimming and
/// lowercasing. Lists of different length never match.
#[must_use]
pub fn answers_match(given: &[String], expected: &[String]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    let mut a: Vec<&str> = given.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = expected.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a.iter()
        .zip(&b)
        .all(|(x, y)| x.trim().to_lowercase() == y.trim().to_lowercase())
}

/// Percentage of questions answered correctly, rounded half away from zero.
///
/// Missing answers count as wrong; an empty question list scores 0.
#[must_use]
pub fn score_answers(questions: &[QuizQuestion], answers: &[Vec<String>]) -> u8 {
    if questions.is_empty() {
        return 0;
    }
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i).is_some_and(|given| q.is_correct(given)))
        .count();

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = ((correct as f64 / questions.len() as f64) * 100.0).round() as u8;
    pct
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn question(correct: &[&str]) -> QuizQuestion {
        QuizQuestion {
            question: "Which are noble gases?".into(),
            options: s(&["Neon", "Argon", "Oxygen", "Helium"]),
            correct_answer: s(correct),
            explanation: String::new(),
        }
    }

    #[test]
    fn order_does_not_matter() {
        let q = question(&["Neon", "Argon"]);
        assert!(q.is_correct(&s(&["Argon", "Neon"])));
    }

    #[test]
    fn case_and_whitespace_are_ignored() {
        let q = question(&["Mitochondria"]);
        assert!(q.is_correct(&s(&["  mitochondria "])));
    }

    #[test]
    fn length_mismatch_fails() {
        let q = question(&["Neon", "Argon"]);
        assert!(!q.is_correct(&s(&["Neon"])));
        assert!(!q.is_correct(&s(&["Neon", "Argon", "Helium"])));
        assert!(!q.is_correct(&[]));
    }

    #[test]
    fn sorting_happens_before_case_folding() {
        // "b" sorts after "C" as given, so the pairwise comparison
        // lines up "C"/"b" against "b"/"c" and fails.
        assert!(!answers_match(&s(&["b", "C"]), &s(&["b", "c"])));
        assert!(answers_match(&s(&["B", "C"]), &s(&["b", "c"])));
    }

    #[test]
    fn multiple_choice_selection_toggles() {
        let mut current = Vec::new();
        QuizType::MultipleChoice.select(&mut current, "Neon");
        QuizType::MultipleChoice.select(&mut current, "Argon");
        QuizType::MultipleChoice.select(&mut current, "Neon");
        assert_eq!(current, s(&["Argon"]));
    }

    #[test]
    fn single_answer_kinds_replace() {
        let mut current = Vec::new();
        QuizType::TrueFalse.select(&mut current, "True");
        QuizType::TrueFalse.select(&mut current, "False");
        assert_eq!(current, s(&["False"]));
    }

    #[test]
    fn score_rounds_to_nearest_percent() {
        let questions = vec![question(&["Neon"]), question(&["Argon"]), question(&["Helium"])];
        let answers = vec![s(&["neon"]), s(&["Argon"]), s(&["Oxygen"])];
        assert_eq!(score_answers(&questions, &answers), 67);
        assert_eq!(score_answers(&questions, &answers[..1]), 33);
        assert_eq!(score_answers(&[], &[]), 0);
    }
}
