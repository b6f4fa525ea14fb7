use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{Redirect, Response};
use std::convert::Infallible;

use crate::auth::session;
use crate::db;
use crate::models::User;
use crate::routes::AppState;

/// Restores the caller's identity at the start of every request: read the
/// session cookie, verify the token, re-read the user row by id. Every
/// failure along the way silently leaves the request anonymous.
pub async fn restore(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(session::token_from_cookie_header)
        .map(str::to_owned);

    if let Some(token) = token {
        if let Some(user_id) = session::verify_token(&token, &state.config.session_secret) {
            match db::users::find_by_id(&state.pool, user_id).await {
                Ok(Some(user)) => {
                    request.extensions_mut().insert(user);
                }
                Ok(None) => {
                    tracing::debug!(%user_id, "Session user no longer exists");
                }
                Err(e) => {
                    tracing::error!(error = ?e, "Failed to restore session user");
                }
            }
        }
    }

    next.run(request).await
}

/// The caller's identity, if any. Never rejects.
pub struct OptionalUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<User>().cloned()))
    }
}

/// A required identity: anonymous callers are redirected to the login page.
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "organizer".to_string(),
            created_at: Utc::now(),
        }
    }

    fn parts_with(user: Option<User>) -> Parts {
        let mut request = HttpRequest::builder().uri("/events").body(()).unwrap();
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_optional_user_present() {
        let user = test_user();
        let mut parts = parts_with(Some(user.clone()));
        let OptionalUser(found) = OptionalUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_optional_user_absent() {
        let mut parts = parts_with(None);
        let OptionalUser(found) = OptionalUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_auth_user_redirects_when_anonymous() {
        let mut parts = parts_with(None);
        assert!(AuthUser::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_auth_user_passes_through() {
        let user = test_user();
        let mut parts = parts_with(Some(user.clone()));
        let AuthUser(found) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.id, user.id);
    }
}
