//! Category API endpoints.

use axum::extract::{Path, State};
use validator::Validate;

use super::{success, ApiJson, ApiResponse, ApiResult};
use crate::auth::RequireAdmin;
use crate::errors::AppError;
use crate::media::delete_best_effort;
use crate::models::{Category, CreateCategoryRequest, ReorderRequest, UpdateCategoryRequest};
use crate::AppState;

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Category not found with ID {}", id))
}

/// GET /api/categories - List active categories with live published counts.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.repo.list_active_categories().await?;
    Ok(ApiResponse::list(categories))
}

/// GET /api/categories/{id} - Get an active category by ID or slug.
pub async fn get_category(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Category> {
    match state.repo.find_active_category(&identifier).await? {
        Some(category) => success(category),
        None => Err(AppError::NotFound("Category not found".to_string())),
    }
}

/// POST /api/categories - Create a category.
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(mut request): ApiJson<CreateCategoryRequest>,
) -> ApiResult<Category> {
    request.normalize();
    request.validate()?;

    let category = state.repo.create_category(&request).await?;
    tracing::info!(category_id = %category.id, admin_id = %admin.id, "Category created");

    Ok(ApiResponse::new(category).created())
}

/// PUT /api/categories/{id} - Partially update a category.
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(mut request): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Category> {
    request.normalize();
    request.validate_all()?;

    let existing = state.repo.get_category(&id).await?.ok_or_else(|| not_found(&id))?;
    let updated = state.repo.update_category(&existing, &request).await?;

    // A replaced or removed image is no longer referenced anywhere
    if let Some(old) = &existing.image {
        let still_used = updated
            .image
            .as_ref()
            .is_some_and(|new| new.public_id == old.public_id);
        if !still_used {
            delete_best_effort(state.media.as_ref(), [old.public_id.as_str()]).await;
        }
    }

    success(updated)
}

/// DELETE /api/categories/{id} - Delete a category that has no tattoos.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let existing = state.repo.get_category(&id).await?.ok_or_else(|| not_found(&id))?;

    let referencing = state.repo.count_tattoos_in_category(&id).await?;
    if existing.tattoo_count > 0 || referencing > 0 {
        return Err(AppError::Dependency(
            "Cannot delete a category that has tattoos assigned".to_string(),
        ));
    }

    state.repo.delete_category(&id).await?;
    if let Some(image) = &existing.image {
        delete_best_effort(state.media.as_ref(), [image.public_id.as_str()]).await;
    }
    tracing::info!(category_id = %id, admin_id = %admin.id, "Category deleted");

    Ok(ApiResponse::message("Category deleted successfully"))
}

/// PUT /api/categories/reorder - Set category positions.
pub async fn reorder_categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> ApiResult<()> {
    request.validate()?;
    state.repo.reorder_categories(&request.items).await?;
    Ok(ApiResponse::message("Categories reordered successfully"))
}
