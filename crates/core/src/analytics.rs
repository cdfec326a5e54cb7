//! Read-only statistics derived from progress logs.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{ProgressEvent, Subject};

/// Mean of all quiz scores, or `None` when no quiz was taken.
#[must_use]
pub fn average_quiz_score(progress: &[ProgressEvent]) -> Option<f64> {
    let scores: Vec<u8> = progress.iter().filter_map(ProgressEvent::quiz_score).collect();
    if scores.is_empty() {
        return None;
    }
    let total: u32 = scores.iter().copied().map(u32::from).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(total) / scores.len() as f64;
    Some(mean)
}

/// Average quiz score as shown on a subject page: whole percent, 0 if none.
#[must_use]
pub fn rounded_average_quiz_score(progress: &[ProgressEvent]) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    average_quiz_score(progress).map_or(0, |mean| mean.round() as u8)
}

/// Sum of cards reviewed across all flashcard sessions.
#[must_use]
pub fn total_cards_reviewed(progress: &[ProgressEvent]) -> u64 {
    progress
        .iter()
        .filter_map(ProgressEvent::cards_reviewed)
        .map(u64::from)
        .sum()
}

/// Subject with the most logged activity.
///
/// Ties go to the subject listed last. Returns `None` when there are no
/// subjects or none has any activity.
#[must_use]
pub fn most_studied_subject(subjects: &[Subject]) -> Option<&Subject> {
    subjects
        .iter()
        .filter(|s| !s.progress.is_empty())
        .fold(None, |best: Option<&Subject>, s| match best {
            Some(b) if b.progress.len() > s.progress.len() => Some(b),
            _ => Some(s),
        })
}

/// Subject with the lowest mean quiz score among those with at least one quiz.
///
/// Ties go to the subject listed first.
#[must_use]
pub fn weakest_subject(subjects: &[Subject]) -> Option<&Subject> {
    subjects
        .iter()
        .filter_map(|s| average_quiz_score(&s.progress).map(|avg| (s, avg)))
        .fold(None, |best: Option<(&Subject, f64)>, (s, avg)| match best {
            Some((b, b_avg)) if b_avg <= avg => Some((b, b_avg)),
            _ => Some((s, avg)),
        })
        .map(|(s, _)| s)
}

/// Consecutive study days ending today or yesterday.
///
/// All event dates are reduced to distinct calendar days. The streak is 0
/// unless the latest day is today or yesterday; from there it counts back
/// until the first missing day.
#[must_use]
pub fn study_streak<I>(dates: I, now: DateTime<Utc>) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().map(|d| d.date_naive()).collect();
    let mut iter = days.iter().rev();

    let Some(&latest) = iter.next() else {
        return 0;
    };
    let today = now.date_naive();
    let gap = (today - latest).num_days();
    if gap != 0 && gap != 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for &day in iter {
        if (previous - day).num_days() == 1 {
            streak += 1;
            previous = day;
        } else {
            break;
        }
    }
    streak
}

/// Streak across every subject's progress log.
#[must_use]
pub fn subjects_streak(subjects: &[Subject], now: DateTime<Utc>) -> u32 {
    study_streak(
        subjects
            .iter()
            .flat_map(|s| s.progress.iter().map(ProgressEvent::date)),
        now,
    )
}

/// Per-subject numbers for the progress page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub average_quiz_score: u8,
    pub cards_reviewed: u64,
    pub quizzes_taken: usize,
    /// Quiz scores in chronological order, for charting.
    pub quiz_history: Vec<(DateTime<Utc>, u8)>,
}

impl SubjectProgress {
    #[must_use]
    pub fn of(subject: &Subject) -> Self {
        let mut quiz_history: Vec<(DateTime<Utc>, u8)> = subject
            .progress
            .iter()
            .filter_map(|e| e.quiz_score().map(|score| (e.date(), score)))
            .collect();
        quiz_history.sort_by_key(|(date, _)| *date);

        Self {
            average_quiz_score: rounded_average_quiz_score(&subject.progress),
            cards_reviewed: total_cards_reviewed(&subject.progress),
            quizzes_taken: quiz_history.len(),
            quiz_history,
        }
    }
}
