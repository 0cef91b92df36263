use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

use crate::{auth::repo_types::User, error::AppError, state::AppState};

/// Header carrying the signed identity token.
pub const TOKEN_HEADER: &str = "x-access-tokens";

/// Requires a valid token and resolves it to the calling user.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!(uri = %parts.uri, "valid token missing");
                AppError::Unauthorized("a valid token is missing".into())
            })?;

        let claims = state.keys.validate(token).map_err(|e| {
            warn!(error = ?e, "token validation failed");
            AppError::Forbidden("token is invalid".into())
        })?;

        let user = User::find_by_public_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(public_id = %claims.sub, "token subject no longer exists");
                AppError::Forbidden("token is invalid".into())
            })?;

        debug!(user_id = user.id, "token validation successful");
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}, routing::get, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn protected(AuthUser(user): AuthUser) -> String {
        user.name
    }

    fn app() -> (Router, AppState) {
        let state = AppState::fake();
        let app = Router::new()
            .route("/guarded", get(protected))
            .with_state(state.clone());
        (app, state)
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::get("/guarded").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_forbidden() {
        let (app, _) = app();
        let res = app
            .oneshot(
                Request::get("/guarded")
                    .header(TOKEN_HEADER, "definitely-not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn expired_token_is_forbidden() {
        let (app, state) = app();
        let token = state
            .keys
            .issue_with_ttl(Uuid::new_v4(), time::Duration::minutes(-31))
            .unwrap();
        let res = app
            .oneshot(
                Request::get("/guarded")
                    .header(TOKEN_HEADER, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
