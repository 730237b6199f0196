//! Site settings endpoints.

use axum::extract::{Multipart, State};
use serde::Serialize;
use validator::Validate;

use super::{read_image, success, ApiResult, ImageFile};
use crate::auth::RequireAdmin;
use crate::errors::AppError;
use crate::media::delete_best_effort;
use crate::models::{Settings, SettingsPatch};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsBody {
    pub settings: Settings,
}

/// GET /api/settings - Current settings, created with defaults on first access.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsBody> {
    let settings = state.repo.get_or_create_settings().await?;
    success(SettingsBody { settings })
}

/// PUT /api/settings - Merge text sections and replace section images.
///
/// Multipart fields: `settings` (JSON with optional `hero`, `about` and `footer`
/// objects), `heroImage` and `aboutImage`.
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> ApiResult<SettingsBody> {
    let mut patch = SettingsPatch::default();
    let mut hero_image: Option<ImageFile> = None;
    let mut about_image: Option<ImageFile> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("settings") => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    patch = serde_json::from_str(&text).map_err(|e| {
                        AppError::invalid_field("settings", &format!("Invalid settings JSON: {}", e))
                    })?;
                }
            }
            Some("heroImage") => hero_image = Some(read_image(field).await?),
            Some("aboutImage") => about_image = Some(read_image(field).await?),
            _ => {}
        }
    }

    let mut settings = state.repo.get_or_create_settings().await?;
    settings.apply_patch(patch).map_err(|e| {
        AppError::invalid_field("settings", &format!("Invalid settings value: {}", e))
    })?;
    settings.validate()?;

    let folder = format!("{}/settings", state.media_folder());

    let hero = match hero_image {
        Some(file) => Some(file.upload(&state, &folder).await?),
        None => None,
    };
    let about = match about_image {
        Some(file) => match file.upload(&state, &folder).await {
            Ok(uploaded) => Some(uploaded),
            Err(e) => {
                // Nothing references the fresh hero image yet
                let orphan = hero.as_ref().map(|h| h.public_id.as_str());
                delete_best_effort(state.media.as_ref(), orphan).await;
                return Err(e);
            }
        },
        None => None,
    };

    let mut replaced = Vec::new();
    if let Some(uploaded) = &hero {
        replaced.push(std::mem::replace(
            &mut settings.hero.custom_image_public_id,
            uploaded.public_id.clone(),
        ));
        settings.hero.custom_image_url = uploaded.url.clone();
    }
    if let Some(uploaded) = &about {
        replaced.push(std::mem::replace(
            &mut settings.about.image_public_id,
            uploaded.public_id.clone(),
        ));
        settings.about.image_url = uploaded.url.clone();
    }

    let new_ids: Vec<&str> = hero
        .iter()
        .chain(about.iter())
        .map(|uploaded| uploaded.public_id.as_str())
        .collect();
    let settings = match state.repo.save_settings(&settings).await {
        Ok(settings) => settings,
        Err(e) => {
            delete_best_effort(state.media.as_ref(), new_ids).await;
            return Err(e);
        }
    };

    // Old images are only dropped once the new ones are stored
    let replaced: Vec<&str> = replaced.iter().map(String::as_str).collect();
    delete_best_effort(state.media.as_ref(), replaced).await;

    tracing::info!(admin_id = %admin.id, "Settings updated");

    success(SettingsBody { settings })
}
