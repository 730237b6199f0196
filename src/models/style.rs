//! Style model: a tattoo technique with a denormalized count of all its tattoos.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trim_opt, validate_sluggable};

/// A tattoo style such as blackwork or fine line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub position: i64,
    /// Number of tattoos in this style, published or not
    pub tattoo_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a style.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStyleRequest {
    #[validate(
        length(min = 1, max = 50, message = "Style name is required and cannot exceed 50 characters"),
        custom(function = "validate_sluggable")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: Option<i64>,
}

impl CreateStyleRequest {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        trim_opt(&mut self.description);
    }
}

/// Request body for a partial style update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStyleRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 50, message = "Style name is required and cannot exceed 50 characters"),
        custom(function = "validate_sluggable")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: Option<i64>,
}

impl UpdateStyleRequest {
    pub fn normalize(&mut self) {
        if let Some(name) = &mut self.name {
            *name = name.trim().to_string();
        }
    }
}

/// Query parameters for `GET /api/styles`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleListQuery {
    #[serde(default)]
    pub is_active: Option<bool>,
}
