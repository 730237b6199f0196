//! Category model: a portfolio grouping with a denormalized published-tattoo count.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{deserialize_some, trim_opt, validate_hex_color, validate_sluggable};

pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

/// A hosted image with the handle needed to delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    #[validate(url(message = "Image URL is not valid"))]
    pub url: String,
    #[serde(default)]
    pub public_id: String,
}

/// A category that tattoos are filed under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub is_active: bool,
    pub position: i64,
    /// Number of published tattoos in this category
    pub tattoo_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a category.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(
        length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"),
        custom(function = "validate_sluggable")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Description cannot exceed 200 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: Option<i64>,
}

impl CreateCategoryRequest {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        trim_opt(&mut self.description);
    }
}

/// Request body for a partial category update.
///
/// `image` is tri-state: absent keeps the current image, `null` removes it, an
/// object replaces it.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    #[validate(
        length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"),
        custom(function = "validate_sluggable")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Description cannot exceed 200 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image: Option<Option<ImageRef>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: Option<i64>,
}

impl UpdateCategoryRequest {
    pub fn normalize(&mut self) {
        if let Some(name) = &mut self.name {
            *name = name.trim().to_string();
        }
        if let Some(description) = &mut self.description {
            *description = description.trim().to_string();
        }
    }

    /// Validate the request including the replacement image, if any.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        if let Some(Some(image)) = &self.image {
            image.validate()?;
        }
        Ok(())
    }
}
