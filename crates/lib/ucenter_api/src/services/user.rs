//! User service: profile lookup and admin operations.

use tracing::info;
use ucenter_core::models::auth::Identity;
use ucenter_core::models::user::User;
use ucenter_core::users::UserPage;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Largest page an admin search may request.
const MAX_PAGE_SIZE: u32 = 100;

/// Re-read the caller's profile from the directory.
pub async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn search(
    state: &AppState,
    username: &str,
    current: u32,
    size: u32,
) -> AppResult<UserPage> {
    let page = state
        .users
        .search(username, current.max(1), size.clamp(1, MAX_PAGE_SIZE))
        .await?;
    Ok(page)
}

/// Delete a user on behalf of an admin. Admins cannot delete themselves.
pub async fn delete(state: &AppState, identity: &Identity, id: i64) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::Validation("Invalid user ID".into()));
    }
    if id == identity.user_id {
        return Err(AppError::Validation("Cannot delete yourself".into()));
    }
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    info!(user_id = id, by = identity.user_id, "user deleted");
    Ok(())
}
