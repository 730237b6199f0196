use sqlx::Row;

use super::repository::{duplicate_as, new_id, now, Repository};
use crate::errors::AppError;
use crate::models::{
    Category, CreateCategoryRequest, ImageRef, PositionUpdate, UpdateCategoryRequest,
    DEFAULT_CATEGORY_COLOR,
};
use crate::slug::slugify;

const CATEGORY_COLUMNS: &str = "id, name, slug, description, color, icon, image_url, image_public_id, is_active, position, tattoo_count, created_at, updated_at";

const DUPLICATE_CATEGORY: &str = "A category with that name already exists";

impl Repository {
    // ==================== CATEGORY OPERATIONS ====================

    /// List active categories with their live published-tattoo counts.
    pub async fn list_active_categories(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.name, c.slug, c.description, c.color, c.icon, c.image_url,
                      c.image_public_id, c.is_active, c.position, c.created_at, c.updated_at,
                      (SELECT COUNT(*) FROM tattoos t
                        WHERE t.category_id = c.id AND t.is_published = 1) AS tattoo_count
               FROM categories c
               WHERE c.is_active = 1
               ORDER BY c.position, c.name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: &str) -> Result<Option<Category>, AppError> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Find an active category by ID or slug.
    pub async fn find_active_category(&self, identifier: &str) -> Result<Option<Category>, AppError> {
        let sql = format!(
            "SELECT {} FROM categories WHERE (id = ? OR slug = ?) AND is_active = 1",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identifier)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Create a new category. The slug is derived from the name.
    pub async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<Category, AppError> {
        let id = new_id();
        let now = now();
        let slug = slugify(&request.name);
        let color = request
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
        let icon = request.icon.clone().unwrap_or_default();
        let is_active = request.is_active.unwrap_or(true);
        let position = request.position.unwrap_or(0);

        sqlx::query(
            "INSERT INTO categories (id, name, slug, description, color, icon, image_url, image_public_id, is_active, position, tattoo_count, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&slug)
        .bind(&request.description)
        .bind(&color)
        .bind(&icon)
        .bind(request.image.as_ref().map(|i| i.url.clone()))
        .bind(request.image.as_ref().map(|i| i.public_id.clone()))
        .bind(is_active as i32)
        .bind(position)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_as(e, DUPLICATE_CATEGORY))?;

        Ok(Category {
            id,
            name: request.name.clone(),
            slug,
            description: request.description.clone(),
            color,
            icon,
            image: request.image.clone(),
            is_active,
            position,
            tattoo_count: 0,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Apply a partial update to an existing category.
    ///
    /// A new name regenerates the slug. `tattoo_count` is never touched here.
    pub async fn update_category(
        &self,
        existing: &Category,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let now = now();

        let name = request.name.clone().unwrap_or_else(|| existing.name.clone());
        let slug = if name != existing.name {
            slugify(&name)
        } else {
            existing.slug.clone()
        };
        let description = request
            .description
            .clone()
            .or_else(|| existing.description.clone())
            .filter(|d| !d.is_empty());
        let color = request.color.clone().unwrap_or_else(|| existing.color.clone());
        let icon = request.icon.clone().unwrap_or_else(|| existing.icon.clone());
        let image = match &request.image {
            Some(replacement) => replacement.clone(),
            None => existing.image.clone(),
        };
        let is_active = request.is_active.unwrap_or(existing.is_active);
        let position = request.position.unwrap_or(existing.position);

        let result = sqlx::query(
            "UPDATE categories SET name = ?, slug = ?, description = ?, color = ?, icon = ?, image_url = ?, image_public_id = ?, is_active = ?, position = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&name)
        .bind(&slug)
        .bind(&description)
        .bind(&color)
        .bind(&icon)
        .bind(image.as_ref().map(|i| i.url.clone()))
        .bind(image.as_ref().map(|i| i.public_id.clone()))
        .bind(is_active as i32)
        .bind(position)
        .bind(&now)
        .bind(&existing.id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_as(e, DUPLICATE_CATEGORY))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category not found with ID {}",
                existing.id
            )));
        }

        Ok(Category {
            id: existing.id.clone(),
            name,
            slug,
            description,
            color,
            icon,
            image,
            is_active,
            position,
            tattoo_count: existing.tattoo_count,
            created_at: existing.created_at.clone(),
            updated_at: now,
        })
    }

    /// Delete a category.
    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category not found with ID {}", id)));
        }
        Ok(())
    }

    /// Set category positions.
    pub async fn reorder_categories(&self, items: &[PositionUpdate]) -> Result<(), AppError> {
        self.reorder("categories", "Category", items).await
    }
}

fn category_from_row(row: &sqlx::sqlite::SqliteRow) -> Category {
    let is_active: i32 = row.get("is_active");
    let image_url: Option<String> = row.get("image_url");
    let image_public_id: Option<String> = row.get("image_public_id");
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        color: row.get("color"),
        icon: row.get("icon"),
        image: image_url.map(|url| ImageRef {
            url,
            public_id: image_public_id.unwrap_or_default(),
        }),
        is_active: is_active != 0,
        position: row.get("position"),
        tattoo_count: row.get("tattoo_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
