use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{StorageError, UserDataRecord, UserDataRepository, validate_user_id};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl UserDataRepository for SqliteRepository {
    async fn save_user_data(&self, record: &UserDataRecord) -> Result<(), StorageError> {
        let user_id = validate_user_id(&record.user_id)?;
        let payload = record.payload()?;

        sqlx::query(
            r"
            INSERT INTO user_data (user_id, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(payload)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load_user_data(&self, user_id: &str) -> Result<Option<UserDataRecord>, StorageError> {
        let user_id = validate_user_id(user_id)?;
        let row = sqlx::query(
            r"
            SELECT user_id, payload, updated_at
            FROM user_data
            WHERE user_id = ?1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: String = row.try_get("user_id").map_err(ser)?;
        let payload: String = row.try_get("payload").map_err(ser)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;

        UserDataRecord::from_payload(user_id, &payload, updated_at).map(Some)
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<(), StorageError> {
        let user_id = validate_user_id(user_id)?;
        let res = sqlx::query("DELETE FROM user_data WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
