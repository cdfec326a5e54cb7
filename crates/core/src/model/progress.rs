use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed study activity, appended to a subject's progress log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Quiz {
        date: DateTime<Utc>,
        /// Final percentage, 0-100.
        score: u8,
    },
    Flashcards {
        date: DateTime<Utc>,
        cards_reviewed: u32,
    },
}

impl ProgressEvent {
    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            ProgressEvent::Quiz { date, .. } | ProgressEvent::Flashcards { date, .. } => *date,
        }
    }

    #[must_use]
    pub fn quiz_score(&self) -> Option<u8> {
        match self {
            ProgressEvent::Quiz { score, .. } => Some(*score),
            ProgressEvent::Flashcards { .. } => None,
        }
    }

    #[must_use]
    pub fn cards_reviewed(&self) -> Option<u32> {
        match self {
            ProgressEvent::Flashcards { cards_reviewed, .. } => Some(*cards_reviewed),
            ProgressEvent::Quiz { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn serializes_with_type_tag() {
        let event = ProgressEvent::Flashcards {
            date: fixed_now(),
            cards_reviewed: 12,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "flashcards");
        assert_eq!(json["cards_reviewed"], 12);
    }

    #[test]
    fn accessors_only_expose_their_kind() {
        let quiz = ProgressEvent::Quiz {
            date: fixed_now(),
            score: 80,
        };
        assert_eq!(quiz.quiz_score(), Some(80));
        assert_eq!(quiz.cards_reviewed(), None);
        assert_eq!(quiz.date(), fixed_now());
    }
}
