//! Data models for the portfolio backend.
//!
//! Wire names are camelCase to match the frontend.

mod category;
mod settings;
mod style;
mod tattoo;
mod user;

pub use category::*;
pub use settings::*;
pub use style::*;
pub use tattoo::*;
pub use user::*;

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::slug::slugify;

/// One `{id, position}` pair of a reorder request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PositionUpdate {
    #[validate(length(min = 1, message = "Id is required"))]
    pub id: String,
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: i64,
}

/// Request body for `PUT /{resources}/reorder`.
///
/// The list is keyed by the resource family (`categories`, `styles` or `tattoos`).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderRequest {
    #[serde(alias = "categories", alias = "styles", alias = "tattoos")]
    #[validate(nested)]
    pub items: Vec<PositionUpdate>,
}

/// Distinguishes an absent field from an explicit `null` in partial updates.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` field.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

pub(crate) fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color")
            .with_message("Color must be a hex value like #6B7280".into()))
    }
}

/// Names must produce a non-empty slug.
pub(crate) fn validate_sluggable(name: &str) -> Result<(), ValidationError> {
    if slugify(name).is_empty() {
        Err(ValidationError::new("slug")
            .with_message("Name must contain at least one letter or digit".into()))
    } else {
        Ok(())
    }
}

/// Trim an optional string, mapping blank input to `None`.
pub(crate) fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            *value = None;
        } else if trimmed.len() != v.len() {
            *value = Some(trimmed.to_string());
        }
    }
}
