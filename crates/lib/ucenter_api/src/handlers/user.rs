//! User request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::models::{
    LoginRequest, LogoutResponse, PageResult, RegisterRequest, RegisterResponse, SearchQuery,
    UserView,
};
use crate::services::{auth, headers, user};

/// `POST /api/user/register`: create a new account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let id = auth::register(&state, body).await?;
    Ok(Json(RegisterResponse { id }))
}

/// `POST /api/user/login`: authenticate and hand out a token pair in the
/// `x-jwt-token` / `x-refresh-token` response headers.
pub async fn login_handler(
    State(state): State<AppState>,
    request_headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> AppResult<(HeaderMap, Json<UserView>)> {
    let user_agent = request_headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let (user, tokens) =
        auth::login(&state, &body.user_account, &body.user_password, user_agent).await?;
    Ok((headers::credential_headers(&tokens)?, Json(user.into())))
}

/// `GET /api/user/current`: the caller's own profile.
pub async fn current_user_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> AppResult<Json<UserView>> {
    let user = user::current_user(&state, &identity).await?;
    Ok(Json(user.into()))
}

/// `POST /api/user/logout`: revoke the current session and blank the
/// credential headers.
pub async fn logout_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> AppResult<(HeaderMap, Json<LogoutResponse>)> {
    auth::logout(&state, &identity).await?;
    Ok((
        headers::cleared_credential_headers(),
        Json(LogoutResponse { success: true }),
    ))
}

/// `GET /api/user/search`: admin only.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<PageResult<UserView>>> {
    let page = user::search(&state, &query.username, query.current, query.size).await?;
    Ok(Json(PageResult {
        records: page.records.into_iter().map(UserView::from).collect(),
        total: page.total,
    }))
}

/// `DELETE /api/user/{id}`: admin only.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    user::delete(&state, &identity, id).await?;
    Ok(Json(true))
}
