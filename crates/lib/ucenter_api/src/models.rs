//! Request and response bodies.
//!
//! Wire names are camelCase; domain models live in `ucenter_core::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ucenter_core::models::auth::Role;
use ucenter_core::models::user::User;

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_account: String,
    pub user_password: String,
    pub check_password: String,
    pub planet_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_account: String,
    pub user_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Query for `GET /api/user/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_current")]
    pub current: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_current() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

/// Public view of a user; never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub user_account: String,
    pub avatar_url: String,
    pub gender: i16,
    pub phone: String,
    pub email: String,
    pub user_status: i16,
    pub user_role: Role,
    pub planet_code: String,
    pub create_time: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            user_account: u.account,
            avatar_url: u.avatar_url,
            gender: u.gender,
            phone: u.phone,
            email: u.email,
            user_status: u.status,
            user_role: u.role,
            planet_code: u.planet_code,
            create_time: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub records: Vec<T>,
    pub total: u64,
}
