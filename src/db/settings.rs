use sqlx::Row;

use super::repository::{now, Repository};
use crate::errors::AppError;
use crate::models::{AboutSettings, FooterSettings, HeroSettings, Settings};

impl Repository {
    // ==================== SETTINGS OPERATIONS ====================

    /// Load the settings singleton, creating it with defaults on first access.
    pub async fn get_or_create_settings(&self) -> Result<Settings, AppError> {
        let now = now();
        sqlx::query(
            "INSERT OR IGNORE INTO settings (id, hero, about, footer, created_at, updated_at) VALUES (1, ?, ?, ?, ?, ?)",
        )
        .bind(serde_json::to_string(&HeroSettings::default())?)
        .bind(serde_json::to_string(&AboutSettings::default())?)
        .bind(serde_json::to_string(&FooterSettings::default())?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT hero, about, footer, created_at, updated_at FROM settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;

        let hero: String = row.get("hero");
        let about: String = row.get("about");
        let footer: String = row.get("footer");

        Ok(Settings {
            hero: serde_json::from_str(&hero)?,
            about: serde_json::from_str(&about)?,
            footer: serde_json::from_str(&footer)?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Persist all three sections and stamp `updated_at`.
    pub async fn save_settings(&self, settings: &Settings) -> Result<Settings, AppError> {
        let mut saved = settings.clone();
        saved.updated_at = now();

        sqlx::query("UPDATE settings SET hero = ?, about = ?, footer = ?, updated_at = ? WHERE id = 1")
            .bind(serde_json::to_string(&saved.hero)?)
            .bind(serde_json::to_string(&saved.about)?)
            .bind(serde_json::to_string(&saved.footer)?)
            .bind(&saved.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(saved)
    }
}
