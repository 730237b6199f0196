//! Tattoo model: one artwork in the portfolio.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::trim_opt;

/// Size classification of a piece.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TattooSize {
    #[serde(rename = "pequeño")]
    Small,
    #[serde(rename = "mediano")]
    #[default]
    Medium,
    #[serde(rename = "grande")]
    Large,
    #[serde(rename = "extra-grande")]
    ExtraLarge,
}

impl TattooSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TattooSize::Small => "pequeño",
            TattooSize::Medium => "mediano",
            TattooSize::Large => "grande",
            TattooSize::ExtraLarge => "extra-grande",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pequeño" => Some(TattooSize::Small),
            "mediano" => Some(TattooSize::Medium),
            "grande" => Some(TattooSize::Large),
            "extra-grande" => Some(TattooSize::ExtraLarge),
            _ => None,
        }
    }
}

/// Where on the body a piece sits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Brazo,
    Pierna,
    Espalda,
    Pecho,
    Cuello,
    Mano,
    Pie,
    Torso,
    #[default]
    Otro,
}

impl BodyPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Brazo => "brazo",
            BodyPart::Pierna => "pierna",
            BodyPart::Espalda => "espalda",
            BodyPart::Pecho => "pecho",
            BodyPart::Cuello => "cuello",
            BodyPart::Mano => "mano",
            BodyPart::Pie => "pie",
            BodyPart::Torso => "torso",
            BodyPart::Otro => "otro",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "brazo" => Some(BodyPart::Brazo),
            "pierna" => Some(BodyPart::Pierna),
            "espalda" => Some(BodyPart::Espalda),
            "pecho" => Some(BodyPart::Pecho),
            "cuello" => Some(BodyPart::Cuello),
            "mano" => Some(BodyPart::Mano),
            "pie" => Some(BodyPart::Pie),
            "torso" => Some(BodyPart::Torso),
            "otro" => Some(BodyPart::Otro),
            _ => None,
        }
    }
}

/// An image of a tattoo stored on the media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TattooImage {
    #[validate(url(message = "Image URL is not valid"))]
    pub url: String,
    #[validate(length(min = 1, message = "Image publicId is required"))]
    pub public_id: String,
    #[validate(range(min = 0, message = "Image width must be zero or positive"))]
    pub width: i64,
    #[validate(range(min = 0, message = "Image height must be zero or positive"))]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A tattoo artwork.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tattoo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub images: Vec<TattooImage>,
    /// Category id
    pub category: String,
    /// Style id
    pub style: String,
    pub tags: Vec<String>,
    pub size: TattooSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub body_part: BodyPart,
    pub is_portfolio: bool,
    pub is_featured: bool,
    pub is_published: bool,
    pub views: i64,
    pub likes: i64,
    pub position: i64,
    /// Id of the user that created the record
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a tattoo.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTattooRequest {
    #[validate(length(min = 1, max = 100, message = "Title is required and cannot exceed 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Description is required and cannot exceed 1000 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<TattooImage>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Style is required"))]
    pub style: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub size: Option<TattooSize>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub body_part: Option<BodyPart>,
    #[serde(default)]
    pub is_portfolio: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: Option<i64>,
}

impl CreateTattooRequest {
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.category = self.category.trim().to_string();
        self.style = self.style.trim().to_string();
        trim_opt(&mut self.duration);
        self.tags = normalize_tags(std::mem::take(&mut self.tags));
    }
}

/// Request body for a partial tattoo update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTattooRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Title is required and cannot exceed 100 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 1000, message = "Description is required and cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Option<Vec<TattooImage>>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Style is required"))]
    pub style: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub size: Option<TattooSize>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub body_part: Option<BodyPart>,
    #[serde(default)]
    pub is_portfolio: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Position must be zero or positive"))]
    pub position: Option<i64>,
}

impl UpdateTattooRequest {
    pub fn normalize(&mut self) {
        if let Some(title) = &mut self.title {
            *title = title.trim().to_string();
        }
        if let Some(category) = &mut self.category {
            *category = category.trim().to_string();
        }
        if let Some(style) = &mut self.style {
            *style = style.trim().to_string();
        }
        if let Some(tags) = self.tags.take() {
            self.tags = Some(normalize_tags(tags));
        }
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Sort orders accepted by the tattoo listing.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TattooSort {
    #[default]
    Position,
    Newest,
    Oldest,
    Views,
    Likes,
}

impl TattooSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            TattooSort::Position => "position ASC, created_at DESC",
            TattooSort::Newest => "created_at DESC",
            TattooSort::Oldest => "created_at ASC",
            TattooSort::Views => "views DESC, created_at DESC",
            TattooSort::Likes => "likes DESC, created_at DESC",
        }
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 12;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for `GET /api/tattoos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TattooListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_portfolio: Option<bool>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: Option<TattooSort>,
}

/// Store-level filter for tattoo queries.
#[derive(Debug, Clone, Default)]
pub struct TattooFilter {
    pub category: Option<String>,
    pub style: Option<String>,
    pub is_featured: Option<bool>,
    pub is_portfolio: Option<bool>,
    pub is_published: Option<bool>,
    pub sort: TattooSort,
    pub limit: i64,
    pub offset: i64,
}

impl TattooListQuery {
    /// Resolve paging and visibility. Only admins may see unpublished tattoos.
    pub fn into_filter(self, is_admin: bool) -> (TattooFilter, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let is_published = if is_admin {
            self.is_published
        } else {
            Some(true)
        };

        let filter = TattooFilter {
            category: self.category.filter(|c| !c.is_empty()),
            style: self.style.filter(|s| !s.is_empty()),
            is_featured: self.is_featured,
            is_portfolio: self.is_portfolio,
            is_published,
            sort: self.sort.unwrap_or_default(),
            limit,
            offset: (page - 1).saturating_mul(limit),
        };
        (filter, page)
    }
}

/// Pagination block of the tattoo listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Count of tattoos grouped under one category or style.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub id: String,
    pub name: String,
    pub count: i64,
}

/// Aggregate numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TattooStats {
    pub total: i64,
    pub published: i64,
    pub featured: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub by_category: Vec<GroupCount>,
    pub by_style: Vec<GroupCount>,
}
