//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::Role;

/// Account status value for a frozen (disabled) account.
pub const STATUS_DISABLED: i16 = 1;

/// Avatar assigned to newly registered accounts.
pub const DEFAULT_AVATAR: &str = "https://avatars.ucenter.dev/default.png";

/// Domain user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub account: String,
    pub avatar_url: String,
    pub gender: i16,
    pub phone: String,
    pub email: String,
    pub status: i16,
    pub role: Role,
    pub planet_code: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_frozen(&self) -> bool {
        self.status == STATUS_DISABLED
    }
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// Fields needed to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub account: String,
    pub password_hash: String,
    pub planet_code: String,
    pub avatar_url: String,
}
