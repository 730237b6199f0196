//! Database repository for CRUD operations.
//!
//! One `Repository` serves every collection; the per-collection operations live in
//! sibling modules as additional `impl Repository` blocks.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::counts::CountStore;
use crate::errors::AppError;
use crate::models::PositionUpdate;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set `position` on every listed record of `table` and nothing else.
    ///
    /// Runs in one transaction; an unknown id rolls the whole batch back.
    pub(super) async fn reorder(
        &self,
        table: &'static str,
        kind: &str,
        items: &[PositionUpdate],
    ) -> Result<(), AppError> {
        let sql = format!("UPDATE {} SET position = ? WHERE id = ?", table);
        let mut tx = self.pool.begin().await?;

        for item in items {
            let result = sqlx::query(&sql)
                .bind(item.position)
                .bind(&item.id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "{} not found with ID {}",
                    kind, item.id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

// ==================== COUNT STORE ====================

#[async_trait]
impl CountStore for Repository {
    async fn count_published_in_category(&self, category_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tattoos WHERE category_id = ? AND is_published = 1",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_in_style(&self, style_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tattoos WHERE style_id = ?")
            .bind(style_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn set_category_count(&self, category_id: &str, count: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE categories SET tattoo_count = ? WHERE id = ?")
            .bind(count)
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_style_count(&self, style_id: &str, count: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE styles SET tattoo_count = ? WHERE id = ?")
            .bind(count)
            .bind(style_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// Helper functions shared by the collection modules

pub(super) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(super) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(super) fn parse_json_array<T: serde::de::DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Map a unique-constraint violation to a kind-specific duplicate message.
pub(super) fn duplicate_as(err: sqlx::Error, message: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => AppError::Duplicate(message.to_string()),
        _ => err.into(),
    }
}
