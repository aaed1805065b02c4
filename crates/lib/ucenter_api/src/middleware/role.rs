//! Authorization middleware: role check on an already-authenticated request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use ucenter_core::auth::AuthRejection;
use ucenter_core::models::auth::{Identity, Role};

use crate::error::AppError;

/// Axum middleware: lets the request through only if the attached identity
/// has exactly the required role.
///
/// Mount with `from_fn_with_state(role, require_role)` inside the
/// authentication layer; one instance per required role. A missing identity
/// means the layers were composed in the wrong order and is answered with 401.
pub async fn require_role(
    State(required): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(identity) = request.extensions().get::<Identity>() else {
        warn!(
            path = %request.uri().path(),
            "role check reached without an authenticated identity"
        );
        return Err(AuthRejection::MissingToken.into());
    };

    if identity.role != required {
        debug!(
            user_id = identity.user_id,
            role = %identity.role,
            required = %required,
            "insufficient role"
        );
        return Err(AuthRejection::Forbidden.into());
    }

    Ok(next.run(request).await)
}
