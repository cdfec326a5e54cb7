use chrono::Duration;
use storage::repository::{Storage, StorageError, UserDataRecord, UserDataRepository};
use storage::sqlite::SqliteRepository;
use study_core::model::{FileId, FlashcardDraft, NewSubject, SubjectDifficulty, SubjectFile};
use study_core::time::fixed_now;
use study_core::{StudyEvent, StudyState};

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn populated_state() -> StudyState {
    let now = fixed_now();
    let mut state = StudyState::default();
    state
        .apply(
            StudyEvent::AddSubject(NewSubject::new("Physics", SubjectDifficulty::Hard)),
            now,
        )
        .unwrap();
    let subject = state.subjects[0].id;
    state
        .apply(
            StudyEvent::SetFlashcards {
                subject,
                cards: vec![FlashcardDraft::new("Force", "Mass times acceleration")],
            },
            now,
        )
        .unwrap();
    let card = state.subjects[0].flashcards[0].id;
    state
        .apply(
            StudyEvent::ReviewFlashcard {
                subject,
                card,
                quality: 4,
            },
            now,
        )
        .unwrap();
    state
        .apply(
            StudyEvent::AddFile {
                subject,
                file: SubjectFile {
                    id: FileId::generate(),
                    name: "lecture.pdf".into(),
                    mime_type: "application/pdf".into(),
                    data: "JVBERi0xLjQK".into(),
                    uploaded_at: Some(now),
                },
            },
            now,
        )
        .unwrap();
    state
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_schedule_and_strips_files() {
    let repo = connect("memdb_roundtrip").await;
    let state = populated_state();

    let record = UserDataRecord::from_state("student-1", &state, fixed_now()).unwrap();
    repo.save_user_data(&record).await.unwrap();

    let loaded = repo
        .load_user_data("student-1")
        .await
        .expect("load")
        .expect("record present");
    assert_eq!(loaded.updated_at, fixed_now());

    let subject = &loaded.state.subjects[0];
    let card = &subject.flashcards[0];
    assert_eq!(card.repetitions, 1);
    assert_eq!(card.interval, 1);
    assert_eq!(card.due_date, fixed_now() + Duration::days(1));
    assert_eq!(subject.files[0].name, "lecture.pdf");
    assert!(subject.files[0].data.is_empty());
}

#[tokio::test]
async fn sqlite_save_overwrites_previous_snapshot() {
    let repo = connect("memdb_overwrite").await;
    let first = UserDataRecord::from_state("student-2", &populated_state(), fixed_now()).unwrap();
    repo.save_user_data(&first).await.unwrap();

    let later = fixed_now() + Duration::hours(2);
    let second = UserDataRecord::from_state("student-2", &StudyState::default(), later).unwrap();
    repo.save_user_data(&second).await.unwrap();

    let loaded = repo.load_user_data("student-2").await.unwrap().unwrap();
    assert!(loaded.state.subjects.is_empty());
    assert_eq!(loaded.updated_at, later);
}

#[tokio::test]
async fn sqlite_delete_and_missing_user() {
    let repo = connect("memdb_delete").await;
    assert!(repo.load_user_data("nobody").await.unwrap().is_none());
    assert!(matches!(
        repo.delete_user_data("nobody").await,
        Err(StorageError::NotFound)
    ));

    let record = UserDataRecord::from_state("student-3", &populated_state(), fixed_now()).unwrap();
    repo.save_user_data(&record).await.unwrap();
    repo.delete_user_data("student-3").await.unwrap();
    assert!(repo.load_user_data("student-3").await.unwrap().is_none());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_facade_uses_sqlite_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_facade?mode=memory&cache=shared")
        .await
        .expect("storage");
    let record = UserDataRecord::from_state("student-4", &populated_state(), fixed_now()).unwrap();
    storage.user_data.save_user_data(&record).await.unwrap();
    let loaded = storage.user_data.load_user_data("student-4").await.unwrap();
    assert_eq!(loaded.unwrap().state.subjects.len(), 1);
}
