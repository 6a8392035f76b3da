//! Bearer-token authentication for `/api` handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;
use utils::jwt::bearer_token;

use crate::{AppState, error::ApiError};

/// The authenticated caller. Handlers that take this extractor reject
/// requests without a token with 401 and requests with a bad token with 403.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.auth().verify_token(token).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::InvalidToken
        })?;

        Ok(CurrentUser {
            id: claims.id,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{app, call, register};

    #[tokio::test]
    async fn missing_token_is_401_and_bad_token_is_403() {
        let (app, _) = app().await;

        let (status, body) = call(&app, "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authenticated");

        let (status, body) = call(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let token = register(&app, "valid").await;
        let (status, body) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "valid");
    }
}
