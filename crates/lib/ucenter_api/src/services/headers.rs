//! Credential response headers: set at login, blanked at logout.
//!
//! Clients read the tokens from these headers and send the access token back
//! as `Authorization: Bearer <token>`. A blank value tells the client to drop
//! what it stored.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use ucenter_core::auth::jwt::LoginTokens;

use crate::error::{AppError, AppResult};

/// Response header carrying the access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-jwt-token";
/// Response header carrying the refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Headers handing a fresh token pair to the client.
pub fn credential_headers(tokens: &LoginTokens) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(ACCESS_TOKEN_HEADER),
        token_value(&tokens.access_token)?,
    );
    headers.insert(
        HeaderName::from_static(REFRESH_TOKEN_HEADER),
        token_value(&tokens.refresh_token)?,
    );
    Ok(headers)
}

/// Headers telling the client to discard both tokens.
pub fn cleared_credential_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(ACCESS_TOKEN_HEADER),
        HeaderValue::from_static(""),
    );
    headers.insert(
        HeaderName::from_static(REFRESH_TOKEN_HEADER),
        HeaderValue::from_static(""),
    );
    headers
}

fn token_value(token: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(token)
        .map_err(|e| AppError::Internal(format!("token is not a valid header value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_land_in_their_headers() {
        let tokens = LoginTokens {
            access_token: "aaa.bbb.ccc".into(),
            refresh_token: "ddd.eee.fff".into(),
            session_id: "abc123".into(),
        };
        let headers = credential_headers(&tokens).unwrap();
        assert_eq!(headers[ACCESS_TOKEN_HEADER], "aaa.bbb.ccc");
        assert_eq!(headers[REFRESH_TOKEN_HEADER], "ddd.eee.fff");
    }

    #[test]
    fn cleared_headers_are_present_but_empty() {
        let headers = cleared_credential_headers();
        assert_eq!(headers[ACCESS_TOKEN_HEADER], "");
        assert_eq!(headers[REFRESH_TOKEN_HEADER], "");
    }
}
