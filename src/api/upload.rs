//! Image upload endpoints and multipart helpers.

use axum::extract::{multipart::Field, Multipart, Path, State};
use serde::Serialize;

use super::{ApiResponse, ApiResult};
use crate::auth::RequireAdmin;
use crate::errors::AppError;
use crate::media::{UploadedMedia, MAX_IMAGES_PER_REQUEST, MAX_IMAGE_BYTES};
use crate::AppState;

/// Multipart field carrying the images of `POST /api/upload`.
const IMAGES_FIELD: &str = "images";

/// An image file read from a multipart request.
#[derive(Debug)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Read one multipart file field, accepting only images up to [`MAX_IMAGE_BYTES`].
pub async fn read_image(field: Field<'_>) -> Result<ImageFile, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();

    if !content_type.starts_with("image/") {
        return Err(AppError::invalid_field(&name, "Only image files are allowed"));
    }

    let bytes = field.bytes().await?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::invalid_field(
            &name,
            "Image exceeds the 10 MB size limit",
        ));
    }

    Ok(ImageFile {
        bytes: bytes.to_vec(),
        filename,
        content_type,
    })
}

impl ImageFile {
    /// Push this file to the media host under `folder`.
    pub async fn upload(self, state: &AppState, folder: &str) -> Result<UploadedMedia, AppError> {
        let uploaded = state
            .media
            .upload(self.bytes, &self.filename, &self.content_type, folder)
            .await?;
        Ok(uploaded)
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedImages {
    pub images: Vec<UploadedMedia>,
}

/// POST /api/upload - Upload 1 to 10 images from the `images` field.
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> ApiResult<UploadedImages> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        if files.len() == MAX_IMAGES_PER_REQUEST {
            return Err(AppError::invalid_field(
                IMAGES_FIELD,
                "At most 10 images can be uploaded at once",
            ));
        }
        files.push(read_image(field).await?);
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No images were selected".to_string()));
    }

    let folder = state.media_folder().to_string();
    let mut images = Vec::with_capacity(files.len());
    for file in files {
        images.push(file.upload(&state, &folder).await?);
    }

    tracing::info!(count = images.len(), admin_id = %admin.id, "Images uploaded");
    Ok(ApiResponse::new(UploadedImages { images }).created())
}

/// DELETE /api/upload/{*public_id} - Remove an image from the media host.
pub async fn delete_image(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(public_id): Path<String>,
) -> ApiResult<()> {
    let public_id = public_id.trim_matches('/');
    if public_id.is_empty() {
        return Err(AppError::BadRequest("An image publicId is required".to_string()));
    }

    state.media.delete(public_id).await?;
    Ok(ApiResponse::message("Image deleted successfully"))
}
