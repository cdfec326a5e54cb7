use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::StudyState;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted snapshot of one user's study state.
///
/// File payloads are stripped when the record is built, so only file
/// metadata reaches the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDataRecord {
    pub user_id: String,
    pub state: StudyState,
    pub updated_at: DateTime<Utc>,
}

impl UserDataRecord {
    /// Build a record for `user_id` from the live state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidUserId` if the trimmed id is empty.
    pub fn from_state(
        user_id: &str,
        state: &StudyState,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            user_id: validate_user_id(user_id)?.to_owned(),
            state: state.for_storage(),
            updated_at,
        })
    }

    /// Serialize the state to the JSON payload stored by backends.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn payload(&self) -> Result<String, StorageError> {
        serde_json::to_string(&self.state).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Rebuild a record from a stored JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the payload is not a valid state.
    pub fn from_payload(
        user_id: String,
        payload: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        let state = serde_json::from_str(payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Self {
            user_id,
            state,
            updated_at,
        })
    }
}

pub(crate) fn validate_user_id(user_id: &str) -> Result<&str, StorageError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidUserId(user_id.to_owned()));
    }
    Ok(trimmed)
}

/// Repository contract for per-user study snapshots.
#[async_trait]
pub trait UserDataRepository: Send + Sync {
    /// Persist or replace the snapshot for `record.user_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_user_data(&self, record: &UserDataRecord) -> Result<(), StorageError>;

    /// Fetch the latest snapshot for a user, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure or a corrupt payload.
    async fn load_user_data(&self, user_id: &str) -> Result<Option<UserDataRecord>, StorageError>;

    /// Remove a user's snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there was nothing to delete.
    async fn delete_user_data(&self, user_id: &str) -> Result<(), StorageError>;
}

/// Process-local user data store used by tests and the in-memory `Storage`.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<HashMap<String, UserDataRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDataRepository for InMemoryRepository {
    async fn save_user_data(&self, record: &UserDataRecord) -> Result<(), StorageError> {
        let user_id = validate_user_id(&record.user_id)?;
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user_id.to_owned(), record.clone());
        Ok(())
    }

    async fn load_user_data(&self, user_id: &str) -> Result<Option<UserDataRecord>, StorageError> {
        let user_id = validate_user_id(user_id)?;
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<(), StorageError> {
        let user_id = validate_user_id(user_id)?;
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(user_id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

/// Holds the repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub user_data: Arc<dyn UserDataRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let user_data: Arc<dyn UserDataRepository> = Arc::new(InMemoryRepository::new());
        Self { user_data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{FileId, NewSubject, SubjectDifficulty, SubjectFile};
    use study_core::time::fixed_now;
    use study_core::StudyEvent;

    fn state_with_file() -> StudyState {
        let mut state = StudyState::default();
        state
            .apply(
                StudyEvent::AddSubject(NewSubject::new("Chemistry", SubjectDifficulty::Hard)),
                fixed_now(),
            )
            .unwrap();
        let subject = state.subjects[0].id;
        state
            .apply(
                StudyEvent::AddFile {
                    subject,
                    file: SubjectFile {
                        id: FileId::generate(),
                        name: "notes.txt".into(),
                        mime_type: "text/plain".into(),
                        data: "aGVsbG8=".into(),
                        uploaded_at: Some(fixed_now()),
                    },
                },
                fixed_now(),
            )
            .unwrap();
        state
    }

    #[tokio::test]
    async fn round_trips_snapshot_without_file_data() {
        let repo = InMemoryRepository::new();
        let state = state_with_file();
        let record = UserDataRecord::from_state("user-1", &state, fixed_now()).unwrap();
        repo.save_user_data(&record).await.unwrap();

        let loaded = repo.load_user_data("user-1").await.unwrap().unwrap();
        assert_eq!(loaded.updated_at, fixed_now());
        let file = &loaded.state.subjects[0].files[0];
        assert_eq!(file.name, "notes.txt");
        assert!(file.data.is_empty());
        assert_eq!(state.subjects[0].files[0].data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn missing_user_loads_none_and_delete_reports_not_found() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_user_data("ghost").await.unwrap().is_none());
        assert!(matches!(
            repo.delete_user_data("ghost").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_removes_snapshot() {
        let repo = InMemoryRepository::new();
        let record =
            UserDataRecord::from_state("user-2", &StudyState::default(), fixed_now()).unwrap();
        repo.save_user_data(&record).await.unwrap();
        repo.delete_user_data("user-2").await.unwrap();
        assert!(repo.load_user_data("user-2").await.unwrap().is_none());
    }

    #[test]
    fn blank_user_id_is_rejected() {
        let err =
            UserDataRecord::from_state("  ", &StudyState::default(), fixed_now()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidUserId(_)));
    }

    #[test]
    fn corrupt_payload_is_serialization_error() {
        let err = UserDataRecord::from_payload("u".into(), "{not json", fixed_now()).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
