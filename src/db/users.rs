use sqlx::Row;

use super::repository::{duplicate_as, new_id, now, Repository};
use crate::errors::AppError;
use crate::models::{Role, UpdateProfileRequest, User};

const USER_COLUMNS: &str =
    "id, name, email, role, avatar, bio, is_active, last_login, created_at, updated_at";

const DUPLICATE_EMAIL: &str = "A user with that email already exists";

impl Repository {
    // ==================== USER OPERATIONS ====================

    /// Create a user. `email` must already be normalized and `password_hash` computed.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let user = self
            .insert_user(name, email, password_hash, role, false)
            .await?;
        user.ok_or_else(|| AppError::Internal("User insert affected no rows".to_string()))
    }

    /// Create a user only while the table is empty.
    ///
    /// Returns `None` when another account already exists. The check and the insert are
    /// one statement, so two concurrent first registrations cannot both succeed.
    pub async fn create_first_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Option<User>, AppError> {
        self.insert_user(name, email, password_hash, role, true)
            .await
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        only_if_empty: bool,
    ) -> Result<Option<User>, AppError> {
        let id = new_id();
        let now = now();

        let mut sql = String::from(
            "INSERT INTO users (id, name, email, password_hash, role, avatar, bio, is_active, last_login, created_at, updated_at) SELECT ?, ?, ?, ?, ?, '', NULL, 1, NULL, ?, ?",
        );
        if only_if_empty {
            sql.push_str(" WHERE NOT EXISTS (SELECT 1 FROM users)");
        }

        let result = sqlx::query(&sql)
            .bind(&id)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(role.as_str())
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_as(e, DUPLICATE_EMAIL))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            avatar: String::new(),
            bio: None,
            is_active: true,
            last_login: None,
            created_at: now.clone(),
            updated_at: now,
        }))
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Look up a user and their password hash by normalized email.
    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, AppError> {
        let sql = format!(
            "SELECT {}, password_hash FROM users WHERE email = ?",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| (user_from_row(&row), row.get("password_hash"))))
    }

    /// Password hash of a user.
    pub async fn get_password_hash(&self, id: &str) -> Result<Option<String>, AppError> {
        let hash: Option<String> = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hash)
    }

    /// Update name, bio and avatar of a user.
    pub async fn update_profile(
        &self,
        existing: &User,
        request: &UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let mut updated = existing.clone();
        if let Some(name) = &request.name {
            updated.name = name.clone();
        }
        if request.bio.is_some() {
            updated.bio = request.bio.clone();
        }
        if let Some(avatar) = &request.avatar {
            updated.avatar = avatar.clone();
        }
        updated.updated_at = now();

        sqlx::query("UPDATE users SET name = ?, bio = ?, avatar = ?, updated_at = ? WHERE id = ?")
            .bind(&updated.name)
            .bind(&updated.bio)
            .bind(&updated.avatar)
            .bind(&updated.updated_at)
            .bind(&updated.id)
            .execute(&self.pool)
            .await?;

        Ok(updated)
    }

    /// Replace a user's password hash.
    pub async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found with ID {}", id)));
        }
        Ok(())
    }

    /// Record a successful login and return the timestamp written.
    pub async fn touch_last_login(&self, id: &str) -> Result<String, AppError> {
        let now = now();
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(now)
    }

    /// List all users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(user_from_row).collect())
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let role: String = row.get("role");
    let is_active: i32 = row.get("is_active");
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: Role::from_str(&role).unwrap_or_default(),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        is_active: is_active != 0,
        last_login: row.get("last_login"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
