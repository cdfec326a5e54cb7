use std::sync::Arc;

use chrono::Duration;
use services::{Clock, StudyService};
use storage::repository::Storage;
use study_core::StudyEvent;
use study_core::model::{FlashcardDraft, NewSubject, ReviewButton, SubjectDifficulty};
use study_core::time::{fixed_now, start_of_day};

#[tokio::test]
async fn review_schedule_survives_restart() {
    let storage = Storage::sqlite("sqlite:file:memdb_study_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    // Reviews at midnight come due again exactly one interval later.
    let now = start_of_day(fixed_now());

    let mut study = StudyService::load("flow", Arc::clone(&storage.user_data))
        .await
        .unwrap()
        .with_clock(Clock::fixed(now));
    study
        .dispatch(StudyEvent::AddSubject(NewSubject::new(
            "Astronomy",
            SubjectDifficulty::Hard,
        )))
        .await
        .unwrap();
    let subject = study.state().subjects[0].id;
    study
        .dispatch(StudyEvent::SetFlashcards {
            subject,
            cards: vec![
                FlashcardDraft::new("Parsec", "3.26 light years"),
                FlashcardDraft::new("Nebula", "Cloud of gas and dust"),
            ],
        })
        .await
        .unwrap();

    let mut session = study.start_flashcard_session(subject).unwrap();
    study
        .answer_flashcard(&mut session, ReviewButton::Easy)
        .await
        .unwrap();
    let step = study
        .answer_flashcard(&mut session, ReviewButton::Easy)
        .await
        .unwrap();
    assert!(step.is_complete);

    // Second pass a day later moves both cards to the 6-day interval.
    let mut study = StudyService::load("flow", Arc::clone(&storage.user_data))
        .await
        .unwrap()
        .with_clock(Clock::fixed(now + Duration::days(1)));
    assert_eq!(study.due_cards(subject).unwrap().len(), 2);

    let mut session = study.start_flashcard_session(subject).unwrap();
    while !session.is_complete() {
        study
            .answer_flashcard(&mut session, ReviewButton::Good)
            .await
            .unwrap();
    }

    let reloaded = StudyService::load("flow", Arc::clone(&storage.user_data))
        .await
        .unwrap()
        .with_clock(Clock::fixed(now + Duration::days(2)));
    let cards = &reloaded.state().subject(subject).unwrap().flashcards;
    assert!(cards.iter().all(|c| c.repetitions == 2 && c.interval == 6));
    assert!(reloaded.due_cards(subject).unwrap().is_empty());

    let stats = reloaded.profile_stats();
    assert_eq!(stats.cards_reviewed, 4);
    assert_eq!(stats.streak_days, 2);
}
