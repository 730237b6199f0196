//! Style API endpoints.

use axum::extract::{Path, State};
use validator::Validate;

use super::{success, ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::auth::RequireAdmin;
use crate::counts::CountStore;
use crate::errors::AppError;
use crate::models::{CreateStyleRequest, ReorderRequest, Style, StyleListQuery, UpdateStyleRequest};
use crate::AppState;

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Style not found with ID {}", id))
}

/// GET /api/styles - List styles, optionally only active ones.
pub async fn list_styles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StyleListQuery>,
) -> ApiResult<Vec<Style>> {
    let styles = state.repo.list_styles(&query).await?;
    Ok(ApiResponse::list(styles))
}

/// GET /api/styles/{id} - Get a single style.
pub async fn get_style(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Style> {
    let style = state.repo.get_style(&id).await?.ok_or_else(|| not_found(&id))?;
    success(style)
}

/// POST /api/styles - Create a style.
pub async fn create_style(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(mut request): ApiJson<CreateStyleRequest>,
) -> ApiResult<Style> {
    request.normalize();
    request.validate()?;

    let style = state.repo.create_style(&request).await?;
    tracing::info!(style_id = %style.id, admin_id = %admin.id, "Style created");

    Ok(ApiResponse::new(style).created())
}

/// PUT /api/styles/{id} - Partially update a style.
pub async fn update_style(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(mut request): ApiJson<UpdateStyleRequest>,
) -> ApiResult<Style> {
    request.normalize();
    request.validate()?;

    let existing = state.repo.get_style(&id).await?.ok_or_else(|| not_found(&id))?;
    let updated = state.repo.update_style(&existing, &request).await?;
    success(updated)
}

/// DELETE /api/styles/{id} - Delete a style no tattoo uses.
pub async fn delete_style(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.get_style(&id).await?.ok_or_else(|| not_found(&id))?;

    let referencing = state.repo.count_in_style(&id).await?;
    if referencing > 0 {
        return Err(AppError::Dependency(format!(
            "Cannot delete style: {} tattoo(s) use it",
            referencing
        )));
    }

    state.repo.delete_style(&id).await?;
    tracing::info!(style_id = %id, admin_id = %admin.id, "Style deleted");

    Ok(ApiResponse::message("Style deleted successfully"))
}

/// PUT /api/styles/reorder - Set style positions.
pub async fn reorder_styles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> ApiResult<()> {
    request.validate()?;
    state.repo.reorder_styles(&request.items).await?;
    Ok(ApiResponse::message("Styles reordered successfully"))
}
