//! Tattoo API endpoints.
//!
//! Every successful mutation is followed by a count recomputation for the category
//! and style it touched. Recount failures are logged by [`CountSync`] and never change
//! the response.

use axum::extract::{Path, State};
use validator::Validate;

use super::{success, ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::auth::{MaybeUser, RequireAdmin};
use crate::counts::{CountSync, TattooRefs};
use crate::errors::AppError;
use crate::media::delete_best_effort;
use crate::models::{
    CreateTattooRequest, Pagination, ReorderRequest, Tattoo, TattooListQuery, TattooStats,
    UpdateTattooRequest,
};
use crate::AppState;

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Tattoo not found with ID {}", id))
}

/// Reject references to categories or styles that do not exist.
async fn check_references(
    state: &AppState,
    category: Option<&str>,
    style: Option<&str>,
) -> Result<(), AppError> {
    if let Some(category) = category {
        if state.repo.get_category(category).await?.is_none() {
            return Err(AppError::invalid_field("category", "Category does not exist"));
        }
    }
    if let Some(style) = style {
        if state.repo.get_style(style).await?.is_none() {
            return Err(AppError::invalid_field("style", "Style does not exist"));
        }
    }
    Ok(())
}

/// GET /api/tattoos - List one page of tattoos.
///
/// Only admins may list unpublished tattoos.
pub async fn list_tattoos(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiQuery(query): ApiQuery<TattooListQuery>,
) -> ApiResult<Vec<Tattoo>> {
    let (filter, page) = query.into_filter(caller.is_admin());
    let (tattoos, total) = state.repo.list_tattoos(&filter).await?;
    Ok(ApiResponse::page(
        tattoos,
        Pagination::new(page, filter.limit, total),
    ))
}

/// GET /api/tattoos/stats - Dashboard aggregates.
pub async fn tattoo_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<TattooStats> {
    let stats = state.repo.tattoo_stats().await?;
    success(stats)
}

/// GET /api/tattoos/{id} - Get a single tattoo.
///
/// Public reads see published tattoos only and count as a view.
pub async fn get_tattoo(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Tattoo> {
    let mut tattoo = state.repo.get_tattoo(&id).await?.ok_or_else(|| not_found(&id))?;

    if !caller.is_admin() {
        if !tattoo.is_published {
            return Err(not_found(&id));
        }
        tattoo.views = state.repo.increment_views(&id).await?;
    }

    success(tattoo)
}

/// POST /api/tattoos - Create a tattoo.
pub async fn create_tattoo(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(mut request): ApiJson<CreateTattooRequest>,
) -> ApiResult<Tattoo> {
    request.normalize();
    request.validate()?;
    check_references(&state, Some(&request.category), Some(&request.style)).await?;

    let tattoo = state.repo.create_tattoo(&request, &admin.id).await?;
    CountSync::new(state.repo.as_ref()).after_create(&tattoo).await;

    tracing::info!(tattoo_id = %tattoo.id, admin_id = %admin.id, "Tattoo created");
    Ok(ApiResponse::new(tattoo).created())
}

/// PUT /api/tattoos/{id} - Partially update a tattoo.
pub async fn update_tattoo(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(mut request): ApiJson<UpdateTattooRequest>,
) -> ApiResult<Tattoo> {
    request.normalize();
    request.validate()?;
    check_references(&state, request.category.as_deref(), request.style.as_deref()).await?;

    let existing = state.repo.get_tattoo(&id).await?.ok_or_else(|| not_found(&id))?;
    let before = TattooRefs::from(&existing);

    let updated = state.repo.update_tattoo(&existing, &request).await?;
    CountSync::new(state.repo.as_ref())
        .after_update(&before, &updated)
        .await;

    let dropped: Vec<&str> = existing
        .images
        .iter()
        .filter(|old| !updated.images.iter().any(|new| new.public_id == old.public_id))
        .map(|old| old.public_id.as_str())
        .collect();
    delete_best_effort(state.media.as_ref(), dropped).await;

    success(updated)
}

/// DELETE /api/tattoos/{id} - Delete a tattoo and its remote images.
pub async fn delete_tattoo(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let existing = state.repo.get_tattoo(&id).await?.ok_or_else(|| not_found(&id))?;
    let refs = TattooRefs::from(&existing);

    state.repo.delete_tattoo(&id).await?;
    CountSync::new(state.repo.as_ref())
        .after_delete(&refs, &id)
        .await;

    let public_ids: Vec<&str> = existing
        .images
        .iter()
        .map(|image| image.public_id.as_str())
        .collect();
    delete_best_effort(state.media.as_ref(), public_ids).await;

    tracing::info!(tattoo_id = %id, admin_id = %admin.id, "Tattoo deleted");
    Ok(ApiResponse::message("Tattoo deleted successfully"))
}

/// PUT /api/tattoos/reorder - Set tattoo positions.
pub async fn reorder_tattoos(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> ApiResult<()> {
    request.validate()?;
    state.repo.reorder_tattoos(&request.items).await?;
    Ok(ApiResponse::message("Tattoos reordered successfully"))
}
