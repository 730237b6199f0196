use sqlx::{QueryBuilder, Row, Sqlite};

use super::repository::{new_id, now, parse_json_array, Repository};
use crate::errors::AppError;
use crate::models::{
    BodyPart, CreateTattooRequest, GroupCount, PositionUpdate, Tattoo, TattooFilter, TattooSize,
    TattooStats, UpdateTattooRequest,
};

const TATTOO_COLUMNS: &str = "id, title, description, images, category_id, style_id, tags, size, duration, body_part, is_portfolio, is_featured, is_published, views, likes, position, created_by, created_at, updated_at";

impl Repository {
    // ==================== TATTOO OPERATIONS ====================

    /// List one page of tattoos matching `filter`, plus the total match count.
    pub async fn list_tattoos(&self, filter: &TattooFilter) -> Result<(Vec<Tattoo>, i64), AppError> {
        let mut count_query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM tattoos WHERE 1 = 1");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM tattoos WHERE 1 = 1", TATTOO_COLUMNS));
        push_filter(&mut page_query, filter);
        page_query.push(" ORDER BY ");
        page_query.push(filter.sort.order_by());
        page_query.push(" LIMIT ");
        page_query.push_bind(filter.limit);
        page_query.push(" OFFSET ");
        page_query.push_bind(filter.offset);

        let rows = page_query.build().fetch_all(&self.pool).await?;
        Ok((rows.iter().map(tattoo_from_row).collect(), total))
    }

    /// Get a tattoo by ID.
    pub async fn get_tattoo(&self, id: &str) -> Result<Option<Tattoo>, AppError> {
        let sql = format!("SELECT {} FROM tattoos WHERE id = ?", TATTOO_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(tattoo_from_row))
    }

    /// Create a new tattoo. Counters start at zero.
    pub async fn create_tattoo(
        &self,
        request: &CreateTattooRequest,
        created_by: &str,
    ) -> Result<Tattoo, AppError> {
        let now = now();
        let tattoo = Tattoo {
            id: new_id(),
            title: request.title.clone(),
            description: request.description.clone(),
            images: request.images.clone(),
            category: request.category.clone(),
            style: request.style.clone(),
            tags: request.tags.clone(),
            size: request.size.unwrap_or_default(),
            duration: request.duration.clone(),
            body_part: request.body_part.unwrap_or_default(),
            is_portfolio: request.is_portfolio.unwrap_or(true),
            is_featured: request.is_featured.unwrap_or(false),
            is_published: request.is_published.unwrap_or(true),
            views: 0,
            likes: 0,
            position: request.position.unwrap_or(0),
            created_by: created_by.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO tattoos (id, title, description, images, category_id, style_id, tags, size, duration, body_part, is_portfolio, is_featured, is_published, views, likes, position, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?, ?)"
        )
        .bind(&tattoo.id)
        .bind(&tattoo.title)
        .bind(&tattoo.description)
        .bind(serde_json::to_string(&tattoo.images)?)
        .bind(&tattoo.category)
        .bind(&tattoo.style)
        .bind(serde_json::to_string(&tattoo.tags)?)
        .bind(tattoo.size.as_str())
        .bind(&tattoo.duration)
        .bind(tattoo.body_part.as_str())
        .bind(tattoo.is_portfolio as i32)
        .bind(tattoo.is_featured as i32)
        .bind(tattoo.is_published as i32)
        .bind(tattoo.position)
        .bind(&tattoo.created_by)
        .bind(&tattoo.created_at)
        .bind(&tattoo.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(tattoo)
    }

    /// Apply a partial update and return the stored result.
    ///
    /// `views`, `likes` and `created_by` are never changed here.
    pub async fn update_tattoo(
        &self,
        existing: &Tattoo,
        request: &UpdateTattooRequest,
    ) -> Result<Tattoo, AppError> {
        let mut updated = existing.clone();
        if let Some(title) = &request.title {
            updated.title = title.clone();
        }
        if let Some(description) = &request.description {
            updated.description = description.clone();
        }
        if let Some(images) = &request.images {
            updated.images = images.clone();
        }
        if let Some(category) = &request.category {
            updated.category = category.clone();
        }
        if let Some(style) = &request.style {
            updated.style = style.clone();
        }
        if let Some(tags) = &request.tags {
            updated.tags = tags.clone();
        }
        if let Some(size) = request.size {
            updated.size = size;
        }
        if let Some(duration) = &request.duration {
            let duration = duration.trim();
            updated.duration = (!duration.is_empty()).then(|| duration.to_string());
        }
        if let Some(body_part) = request.body_part {
            updated.body_part = body_part;
        }
        if let Some(is_portfolio) = request.is_portfolio {
            updated.is_portfolio = is_portfolio;
        }
        if let Some(is_featured) = request.is_featured {
            updated.is_featured = is_featured;
        }
        if let Some(is_published) = request.is_published {
            updated.is_published = is_published;
        }
        if let Some(position) = request.position {
            updated.position = position;
        }
        updated.updated_at = now();

        let result = sqlx::query(
            "UPDATE tattoos SET title = ?, description = ?, images = ?, category_id = ?, style_id = ?, tags = ?, size = ?, duration = ?, body_part = ?, is_portfolio = ?, is_featured = ?, is_published = ?, position = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&updated.title)
        .bind(&updated.description)
        .bind(serde_json::to_string(&updated.images)?)
        .bind(&updated.category)
        .bind(&updated.style)
        .bind(serde_json::to_string(&updated.tags)?)
        .bind(updated.size.as_str())
        .bind(&updated.duration)
        .bind(updated.body_part.as_str())
        .bind(updated.is_portfolio as i32)
        .bind(updated.is_featured as i32)
        .bind(updated.is_published as i32)
        .bind(updated.position)
        .bind(&updated.updated_at)
        .bind(&updated.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Tattoo not found with ID {}",
                existing.id
            )));
        }

        // Re-read so concurrent view increments are reflected
        self.get_tattoo(&updated.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tattoo not found with ID {}", existing.id)))
    }

    /// Delete a tattoo.
    pub async fn delete_tattoo(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tattoos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tattoo not found with ID {}", id)));
        }
        Ok(())
    }

    /// Atomically add one view and return the new value.
    pub async fn increment_views(&self, id: &str) -> Result<i64, AppError> {
        let views: Option<i64> =
            sqlx::query_scalar("UPDATE tattoos SET views = views + 1 WHERE id = ? RETURNING views")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        views.ok_or_else(|| AppError::NotFound(format!("Tattoo not found with ID {}", id)))
    }

    /// Number of tattoos referencing a category, published or not.
    pub async fn count_tattoos_in_category(&self, category_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tattoos WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Dashboard aggregates over all tattoos.
    pub async fn tattoo_stats(&self) -> Result<TattooStats, AppError> {
        let row = sqlx::query(
            r#"SELECT COUNT(*) AS total,
                      COALESCE(SUM(is_published), 0) AS published,
                      COALESCE(SUM(is_featured), 0) AS featured,
                      COALESCE(SUM(views), 0) AS total_views,
                      COALESCE(SUM(likes), 0) AS total_likes
               FROM tattoos"#,
        )
        .fetch_one(&self.pool)
        .await?;

        let by_category = sqlx::query(
            r#"SELECT c.id, c.name, COUNT(t.id) AS count
               FROM categories c JOIN tattoos t ON t.category_id = c.id
               GROUP BY c.id, c.name
               ORDER BY count DESC, c.name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let by_style = sqlx::query(
            r#"SELECT s.id, s.name, COUNT(t.id) AS count
               FROM styles s JOIN tattoos t ON t.style_id = s.id
               GROUP BY s.id, s.name
               ORDER BY count DESC, s.name"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(TattooStats {
            total: row.get("total"),
            published: row.get("published"),
            featured: row.get("featured"),
            total_views: row.get("total_views"),
            total_likes: row.get("total_likes"),
            by_category: by_category.iter().map(group_count_from_row).collect(),
            by_style: by_style.iter().map(group_count_from_row).collect(),
        })
    }

    /// Set tattoo positions.
    pub async fn reorder_tattoos(&self, items: &[PositionUpdate]) -> Result<(), AppError> {
        self.reorder("tattoos", "Tattoo", items).await
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &TattooFilter) {
    if let Some(category) = &filter.category {
        query.push(" AND category_id = ");
        query.push_bind(category.clone());
    }
    if let Some(style) = &filter.style {
        query.push(" AND style_id = ");
        query.push_bind(style.clone());
    }
    if let Some(is_featured) = filter.is_featured {
        query.push(" AND is_featured = ");
        query.push_bind(is_featured as i32);
    }
    if let Some(is_portfolio) = filter.is_portfolio {
        query.push(" AND is_portfolio = ");
        query.push_bind(is_portfolio as i32);
    }
    if let Some(is_published) = filter.is_published {
        query.push(" AND is_published = ");
        query.push_bind(is_published as i32);
    }
}

fn tattoo_from_row(row: &sqlx::sqlite::SqliteRow) -> Tattoo {
    let images: String = row.get("images");
    let tags: String = row.get("tags");
    let size: String = row.get("size");
    let body_part: String = row.get("body_part");
    let is_portfolio: i32 = row.get("is_portfolio");
    let is_featured: i32 = row.get("is_featured");
    let is_published: i32 = row.get("is_published");

    Tattoo {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        images: parse_json_array(&images),
        category: row.get("category_id"),
        style: row.get("style_id"),
        tags: parse_json_array(&tags),
        size: TattooSize::from_str(&size).unwrap_or_default(),
        duration: row.get("duration"),
        body_part: BodyPart::from_str(&body_part).unwrap_or_default(),
        is_portfolio: is_portfolio != 0,
        is_featured: is_featured != 0,
        is_published: is_published != 0,
        views: row.get("views"),
        likes: row.get("likes"),
        position: row.get("position"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn group_count_from_row(row: &sqlx::sqlite::SqliteRow) -> GroupCount {
    GroupCount {
        id: row.get("id"),
        name: row.get("name"),
        count: row.get("count"),
    }
}
