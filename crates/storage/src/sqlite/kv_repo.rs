use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{KeyValueStore, StorageError, StorageKey};

const UPSERT: &str = r"
    INSERT INTO kv_entries (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(value))
    }

    async fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        sqlx::query(UPSERT)
            .bind(key.as_str())
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(StorageKey, String)]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let now = Utc::now();
        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(key.as_str())
                .bind(value.as_str())
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        // Dropping `tx` on an early return rolls the batch back.
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
