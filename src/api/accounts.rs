//! Account endpoints: registration, login and profile management.

use axum::extract::State;
use serde::Serialize;
use validator::Validate;

use super::{success, ApiJson, ApiResponse, ApiResult};
use crate::auth::{hash_password, issue_token, verify_password, AuthUser, MaybeUser, RequireAdmin};
use crate::errors::AppError;
use crate::models::{
    normalize_email, ChangePasswordRequest, LoginRequest, RegisterRequest, Role,
    UpdateProfileRequest, User,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: User,
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn token_for(state: &AppState, user: &User) -> Result<String, AppError> {
    issue_token(user, &state.config.jwt_secret, state.config.jwt_expires_in_days)
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// POST /api/auth/register - Create an account and sign it in.
///
/// The admin role can only be requested for the very first account or by an admin.
pub async fn register(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiJson(mut request): ApiJson<RegisterRequest>,
) -> ApiResult<UserBody> {
    request.normalize();
    request.validate()?;

    let role = request.role.unwrap_or_default();
    let password_hash = hash(&request.password)?;

    let user = if role == Role::Admin && !caller.is_admin() {
        // Only the very first account may claim the admin role on its own
        state
            .repo
            .create_first_user(&request.name, &request.email, &password_hash, role)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Only administrators can create admin accounts".to_string())
            })?
    } else {
        state
            .repo
            .create_user(&request.name, &request.email, &password_hash, role)
            .await?
    };
    let token = token_for(&state, &user)?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");
    Ok(ApiResponse::new(UserBody { user })
        .with_token(token)
        .created())
}

/// POST /api/auth/login - Exchange credentials for a token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<UserBody> {
    request.validate()?;

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let (mut user, password_hash) = state
        .repo
        .find_credentials_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    let matches = verify_password(&request.password, &password_hash).unwrap_or_else(|e| {
        tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
        false
    });
    if !matches {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("User account is deactivated".to_string()));
    }

    user.last_login = Some(state.repo.touch_last_login(&user.id).await?);
    let token = token_for(&state, &user)?;

    Ok(ApiResponse::new(UserBody { user }).with_token(token))
}

/// GET /api/auth/profile - The signed-in user.
pub async fn get_profile(AuthUser(user): AuthUser) -> ApiResult<UserBody> {
    success(UserBody { user })
}

/// PUT /api/auth/profile - Update name, bio and avatar.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(mut request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<UserBody> {
    request.normalize();
    request.validate()?;

    let user = state.repo.update_profile(&user, &request).await?;
    success(UserBody { user })
}

/// PUT /api/auth/change-password - Replace the password after checking the current one.
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    request.validate()?;

    let current_hash = state
        .repo
        .get_password_hash(&user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    if !verify_password(&request.current_password, &current_hash).unwrap_or(false) {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
    }

    let new_hash = hash(&request.new_password)?;
    state.repo.update_password(&user.id, &new_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(ApiResponse::message("Password updated successfully"))
}

/// GET /api/auth/users - All accounts.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Vec<User>> {
    let users = state.repo.list_users().await?;
    Ok(ApiResponse::list(users))
}

/// Create the configured bootstrap admin unless that email is already registered.
pub async fn ensure_bootstrap_admin(state: &AppState) -> Result<(), AppError> {
    let Some(admin) = &state.config.bootstrap_admin else {
        return Ok(());
    };

    let email = normalize_email(&admin.email);
    if state.repo.find_credentials_by_email(&email).await?.is_some() {
        tracing::debug!(email = %email, "Bootstrap admin already exists");
        return Ok(());
    }

    let password_hash = hash(&admin.password)?;
    let user = state
        .repo
        .create_user(&admin.name, &email, &password_hash, Role::Admin)
        .await?;
    tracing::info!(user_id = %user.id, email = %email, "Created bootstrap admin");
    Ok(())
}
