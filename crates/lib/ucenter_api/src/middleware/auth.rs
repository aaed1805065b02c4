//! Authentication middleware: bearer token verification, revocation check,
//! and identity resolution.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use ucenter_core::auth::AuthRejection;
use ucenter_core::auth::jwt::extract_bearer_token;
use ucenter_core::auth::registry;
use ucenter_core::models::auth::{Identity, Role};

use crate::AppState;
use crate::error::AppError;

/// Axum middleware: authenticates every request whose path is not public and
/// injects the resolved [`Identity`] into request extensions.
///
/// Checks run in order and stop at the first failure: token presence,
/// signature, expiry, session revocation, then role lookup. Any failure ends
/// the request with 401 before a handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();

    let identity = authenticate(&state, &parts.headers)
        .await
        .map_err(|rejection| {
            debug!(
                path = %parts.uri.path(),
                reason = rejection.category(),
                "request rejected"
            );
            AppError::Auth(rejection)
        })?;

    parts.extensions.insert(identity);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Resolve the caller presented in `headers`, or say why not.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AuthRejection> {
    let token = extract_bearer_token(headers).ok_or(AuthRejection::MissingToken)?;

    let claims = state.issuer.verify_access_token(token)?;

    let deadline = state.config.registry_timeout;
    match registry::within(deadline, state.registry.is_revoked(&claims.ssid)).await {
        Ok(false) => {}
        Ok(true) => return Err(AuthRejection::RevokedSession),
        Err(e) => {
            warn!(session_id = %claims.ssid, error = %e, "session registry lookup failed");
            return Err(AuthRejection::StoreUnavailable);
        }
    }

    let role = resolve_role(state, claims.uid).await?;
    Ok(Identity::from_claims(claims, role))
}

// The role is authoritative in the user directory, not in the token.
async fn resolve_role(state: &AppState, user_id: i64) -> Result<Role, AuthRejection> {
    let deadline = state.config.registry_timeout;
    match tokio::time::timeout(deadline, state.users.find_by_id(user_id)).await {
        Ok(Ok(Some(user))) => Ok(user.role),
        Ok(Ok(None)) => {
            debug!(user_id, "token subject no longer exists");
            Err(AuthRejection::InvalidToken)
        }
        Ok(Err(e)) => {
            warn!(user_id, error = %e, "user directory lookup failed");
            Err(AuthRejection::StoreUnavailable)
        }
        Err(_) => {
            warn!(user_id, ?deadline, "user directory lookup timed out");
            Err(AuthRejection::StoreUnavailable)
        }
    }
}

/// Extractor for the identity attached by [`require_auth`].
///
/// Rejects with `MissingToken` when used on a route the gate did not run for.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Auth(AuthRejection::MissingToken))
    }
}
