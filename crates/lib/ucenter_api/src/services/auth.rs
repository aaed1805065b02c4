//! Authentication service: registration, login and logout flows.

use tracing::{error, info, warn};
use ucenter_core::auth::jwt::LoginTokens;
use ucenter_core::auth::password::{hash_password, verify_password};
use ucenter_core::auth::registry;
use ucenter_core::models::auth::Identity;
use ucenter_core::models::user::{DEFAULT_AVATAR, NewUser, User};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::RegisterRequest;

/// Register a new account and return its ID.
pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<i64> {
    if [&req.user_account, &req.user_password, &req.planet_code]
        .iter()
        .any(|s| s.trim().is_empty())
    {
        return Err(AppError::Validation("Parameters must not be blank".into()));
    }
    if req.user_password != req.check_password {
        return Err(AppError::Validation(
            "Password and confirmation do not match".into(),
        ));
    }

    let password_hash = hash_password(&req.user_password)?;
    let id = state
        .users
        .create(NewUser {
            username: req.user_account.to_uppercase(),
            account: req.user_account,
            password_hash,
            planet_code: req.planet_code,
            avatar_url: DEFAULT_AVATAR.to_string(),
        })
        .await?;
    info!(user_id = id, "user registered");
    Ok(id)
}

/// Check credentials and open a new session.
///
/// Unknown accounts and wrong passwords produce the same error.
pub async fn login(
    state: &AppState,
    account: &str,
    password: &str,
    user_agent: &str,
) -> AppResult<(User, LoginTokens)> {
    let found = state
        .users
        .find_by_account(account)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &found.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let user = found.user;
    if user.is_frozen() {
        return Err(AppError::Forbidden("Account is frozen".into()));
    }

    let tokens = state
        .issuer
        .issue_login_tokens(user.id, user_agent)
        .map_err(|e| {
            error!(user_id = user.id, error = %e, "failed to sign login tokens");
            AppError::from(e)
        })?;

    info!(user_id = user.id, session_id = %tokens.session_id, "user logged in");
    Ok((user, tokens))
}

/// Revoke the caller's session for the refresh-token lifetime.
///
/// Once this returns, every access token bearing the session ID is rejected.
pub async fn logout(state: &AppState, identity: &Identity) -> AppResult<()> {
    let revoke = state
        .registry
        .revoke(&identity.session_id, state.issuer.refresh_ttl());
    registry::within(state.config.registry_timeout, revoke)
        .await
        .map_err(|e| {
            warn!(session_id = %identity.session_id, error = %e, "failed to revoke session");
            AppError::RegistryUnavailable(e.to_string())
        })?;

    info!(
        user_id = identity.user_id,
        session_id = %identity.session_id,
        "user logged out"
    );
    Ok(())
}
