use sqlx::Row;

use super::repository::{duplicate_as, new_id, now, Repository};
use crate::errors::AppError;
use crate::models::{CreateStyleRequest, PositionUpdate, Style, StyleListQuery, UpdateStyleRequest};
use crate::slug::slugify;

const STYLE_COLUMNS: &str =
    "id, name, slug, description, is_active, position, tattoo_count, created_at, updated_at";

const DUPLICATE_STYLE: &str = "A style with that name already exists";

impl Repository {
    // ==================== STYLE OPERATIONS ====================

    /// List styles ordered by position, optionally filtered by `is_active`.
    pub async fn list_styles(&self, query: &StyleListQuery) -> Result<Vec<Style>, AppError> {
        let mut sql = format!("SELECT {} FROM styles", STYLE_COLUMNS);
        if query.is_active.is_some() {
            sql.push_str(" WHERE is_active = ?");
        }
        sql.push_str(" ORDER BY position, name");

        let mut q = sqlx::query(&sql);
        if let Some(is_active) = query.is_active {
            q = q.bind(is_active as i32);
        }
        let rows = q.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(style_from_row).collect())
    }

    /// Get a style by ID.
    pub async fn get_style(&self, id: &str) -> Result<Option<Style>, AppError> {
        let sql = format!("SELECT {} FROM styles WHERE id = ?", STYLE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(style_from_row))
    }

    /// Create a new style with a zero count.
    pub async fn create_style(&self, request: &CreateStyleRequest) -> Result<Style, AppError> {
        let id = new_id();
        let now = now();
        let slug = slugify(&request.name);
        let is_active = request.is_active.unwrap_or(true);
        let position = request.position.unwrap_or(0);

        sqlx::query(
            "INSERT INTO styles (id, name, slug, description, is_active, position, tattoo_count, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&slug)
        .bind(&request.description)
        .bind(is_active as i32)
        .bind(position)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_as(e, DUPLICATE_STYLE))?;

        Ok(Style {
            id,
            name: request.name.clone(),
            slug,
            description: request.description.clone(),
            is_active,
            position,
            tattoo_count: 0,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update to an existing style.
    pub async fn update_style(
        &self,
        existing: &Style,
        request: &UpdateStyleRequest,
    ) -> Result<Style, AppError> {
        let now = now();

        let name = request.name.clone().unwrap_or_else(|| existing.name.clone());
        let slug = if name != existing.name {
            slugify(&name)
        } else {
            existing.slug.clone()
        };
        let description = match &request.description {
            Some(d) if d.trim().is_empty() => None,
            Some(d) => Some(d.trim().to_string()),
            None => existing.description.clone(),
        };
        let is_active = request.is_active.unwrap_or(existing.is_active);
        let position = request.position.unwrap_or(existing.position);

        let result = sqlx::query(
            "UPDATE styles SET name = ?, slug = ?, description = ?, is_active = ?, position = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&name)
        .bind(&slug)
        .bind(&description)
        .bind(is_active as i32)
        .bind(position)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_as(e, DUPLICATE_STYLE))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Style not found with ID {}",
                existing.id
            )));
        }

        Ok(Style {
            id: existing.id.clone(),
            name,
            slug,
            description,
            is_active,
            position,
            tattoo_count: existing.tattoo_count,
            created_at: existing.created_at.clone(),
            updated_at: now,
        })
    }

    /// Delete a style.
    pub async fn delete_style(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM styles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Style not found with ID {}", id)));
        }
        Ok(())
    }

    /// Set style positions.
    pub async fn reorder_styles(&self, items: &[PositionUpdate]) -> Result<(), AppError> {
        self.reorder("styles", "Style", items).await
    }
}

fn style_from_row(row: &sqlx::sqlite::SqliteRow) -> Style {
    let is_active: i32 = row.get("is_active");
    Style {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        is_active: is_active != 0,
        position: row.get("position"),
        tattoo_count: row.get("tattoo_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
