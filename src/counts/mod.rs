//! Denormalized tattoo counts on categories and styles.
//!
//! `Category.tattoo_count` counts the published tattoos in the category and
//! `Style.tattoo_count` counts every tattoo in the style. Both are maintained by full
//! recounts run after each tattoo mutation has been written, never by increments, so a
//! missed or failed recount is repaired by the next one on the same target.
//!
//! Recount failures are logged and swallowed: the tattoo mutation that triggered them
//! has already succeeded and its response must not change.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::Tattoo;

/// Storage operations the count protocol needs.
#[async_trait]
pub trait CountStore: Send + Sync {
    async fn count_published_in_category(&self, category_id: &str) -> Result<i64, AppError>;

    async fn count_in_style(&self, style_id: &str) -> Result<i64, AppError>;

    async fn set_category_count(&self, category_id: &str, count: i64) -> Result<(), AppError>;

    async fn set_style_count(&self, style_id: &str, count: i64) -> Result<(), AppError>;
}

/// Category and style a tattoo pointed at when it was snapshotted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TattooRefs {
    pub category: String,
    pub style: String,
}

impl From<&Tattoo> for TattooRefs {
    fn from(tattoo: &Tattoo) -> Self {
        Self {
            category: tattoo.category.clone(),
            style: tattoo.style.clone(),
        }
    }
}

/// Runs recounts against a store on behalf of one triggering tattoo.
pub struct CountSync<'a, S: CountStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CountStore + ?Sized> CountSync<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Recount the published tattoos of a category and store the result.
    ///
    /// Returns the written count, or `None` when there was no category or the store
    /// failed.
    pub async fn recompute_category_count(
        &self,
        category_id: Option<&str>,
        tattoo_id: &str,
    ) -> Option<i64> {
        let category_id = category_id.filter(|id| !id.is_empty())?;

        let result = async {
            let count = self.store.count_published_in_category(category_id).await?;
            self.store.set_category_count(category_id, count).await?;
            Ok::<_, AppError>(count)
        }
        .await;

        match result {
            Ok(count) => {
                tracing::debug!(category_id, tattoo_id, count, "Category count recomputed");
                Some(count)
            }
            Err(e) => {
                tracing::error!(
                    category_id,
                    tattoo_id,
                    error = %e,
                    "Failed to recompute category tattoo count"
                );
                None
            }
        }
    }

    /// Recount every tattoo of a style and store the result.
    pub async fn recompute_style_count(
        &self,
        style_id: Option<&str>,
        tattoo_id: &str,
    ) -> Option<i64> {
        let style_id = style_id.filter(|id| !id.is_empty())?;

        let result = async {
            let count = self.store.count_in_style(style_id).await?;
            self.store.set_style_count(style_id, count).await?;
            Ok::<_, AppError>(count)
        }
        .await;

        match result {
            Ok(count) => {
                tracing::debug!(style_id, tattoo_id, count, "Style count recomputed");
                Some(count)
            }
            Err(e) => {
                tracing::error!(
                    style_id,
                    tattoo_id,
                    error = %e,
                    "Failed to recompute style tattoo count"
                );
                None
            }
        }
    }

    /// Call once the new tattoo is stored.
    pub async fn after_create(&self, tattoo: &Tattoo) {
        self.recompute_category_count(Some(&tattoo.category), &tattoo.id)
            .await;
        self.recompute_style_count(Some(&tattoo.style), &tattoo.id)
            .await;
    }

    /// Call once the update is stored, with the references held before it.
    ///
    /// Old targets are recounted only when the reference moved; new targets are always
    /// recounted so publication changes are picked up.
    pub async fn after_update(&self, before: &TattooRefs, after: &Tattoo) {
        if before.category != after.category {
            self.recompute_category_count(Some(&before.category), &after.id)
                .await;
        }
        if before.style != after.style {
            self.recompute_style_count(Some(&before.style), &after.id)
                .await;
        }
        self.recompute_category_count(Some(&after.category), &after.id)
            .await;
        self.recompute_style_count(Some(&after.style), &after.id)
            .await;
    }

    /// Call once the tattoo has been removed, with the references it held.
    pub async fn after_delete(&self, removed: &TattooRefs, tattoo_id: &str) {
        self.recompute_category_count(Some(&removed.category), tattoo_id)
            .await;
        self.recompute_style_count(Some(&removed.style), tattoo_id)
            .await;
    }
}
