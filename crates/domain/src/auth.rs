//! Auth types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// User profile response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub daily_energy_budget: i32,
    pub max_daily_tasks: i32,
    pub created_at: DateTime<Utc>,
}

/// Owner-only policy update.
#[derive(Debug, Deserialize, Validate)]
pub struct UserSettingsUpdate {
    #[validate(range(min = 5, max = 30))]
    pub daily_energy_budget: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub max_daily_tasks: Option<i32>,
}

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: u64,    // expiration timestamp
    pub iat: u64,    // issued at
}
