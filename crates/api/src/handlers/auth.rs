//! Auth handlers: registration, login, profile and policy updates.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use lento_backend_domain::{
    Claims, DomainError, LoginRequest, RegisterRequest, TokenResponse, UserResponse,
    UserSettingsUpdate,
};
use lento_backend_storage::{StorageError, UserRow};

use crate::AppState;
use crate::middleware::auth::AuthUser;

/// Salted SHA-256 digest, stored as `salt$hex`.
fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn user_response(user: UserRow) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        daily_energy_budget: user.daily_energy_budget,
        max_daily_tasks: user.max_daily_tasks,
        created_at: user.created_at,
    }
}

fn issue_token(state: &AppState, user_id: i64) -> Result<String, DomainError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + state.config.token_expire_minutes * 60,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to encode JWT: {}", e);
        DomainError::Internal(anyhow::anyhow!("Failed to generate access token: {}", e))
    })
}

/// Register a new user.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;

    if state
        .user_repo
        .find_by_username(&req.username)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .is_some()
    {
        return Err(DomainError::Validation("用户名已被注册".to_string()));
    }
    if state
        .user_repo
        .find_by_email(&req.email)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .is_some()
    {
        return Err(DomainError::Validation("邮箱已被注册".to_string()));
    }

    let user = state
        .user_repo
        .create(&req.username, &req.email, &hash_password(&req.password))
        .await
        .map_err(|e| match e {
            // The unique index closes the check-then-insert race.
            StorageError::Duplicate => DomainError::Validation("用户名或邮箱已被注册".to_string()),
            other => DomainError::Database(other.to_string()),
        })?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user_response(user))))
}

/// Exchange credentials for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, DomainError> {
    let user = state
        .user_repo
        .find_by_username(&req.username)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| DomainError::Unauthorized("用户名或密码错误".to_string()))?;

    let token = issue_token(&state, user.id)?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Get current user profile.
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, DomainError> {
    let user = state
        .user_repo
        .get_by_id(user_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .ok_or_else(|| DomainError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(user_response(user)))
}

/// Update the daily policy (energy budget, max tasks). Owner only.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<UserSettingsUpdate>,
) -> Result<Json<UserResponse>, DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;

    let user = state
        .user_repo
        .update_settings(user_id, req.daily_energy_budget, req.max_daily_tasks)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .ok_or_else(|| DomainError::NotFound(format!("User {} not found", user_id)))?;

    tracing::info!(
        user_id = user.id,
        daily_energy_budget = user.daily_energy_budget,
        max_daily_tasks = user.max_daily_tasks,
        "User settings updated"
    );

    Ok(Json(user_response(user)))
}
