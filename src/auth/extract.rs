// region:    --- Imports
use crate::app::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use super::SESSION_COOKIE;

// endregion: --- Imports

/// The signed-in user. Handlers taking this require a login; use
/// `Option<CurrentUser>` where anonymous access is allowed.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Sends anonymous users to the login page, remembering where they were going.
#[derive(Debug)]
pub struct LoginRedirect {
    pub next: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let next: String = url::form_urlencoded::byte_serialize(self.next.as_bytes()).collect();
        Redirect::to(&format!("/login?next={next}")).into_response()
    }
}

/// Only same-site absolute paths are followed after login. Browsers read `\`
/// as `/`, so `/\host` would leave the site too.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && path.parse::<PathAndQuery>().is_ok()
        && HeaderValue::from_str(path).is_ok()
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let redirect = || LoginRedirect {
            next: parts
                .uri
                .path_and_query()
                .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string()),
        };

        let jar = CookieJar::from_headers(&parts.headers);
        let Some(user_id) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.sessions.verify(cookie.value()))
            .and_then(|claims| claims.user_id())
        else {
            return Err(redirect());
        };

        // the account may have been removed since the cookie was issued
        match state.store.get_user(user_id).await {
            Ok(Some(user)) => Ok(CurrentUser {
                id: user.id,
                username: user.username,
            }),
            Ok(None) => {
                debug!("{:<12} --> session for unknown user {}", "Auth", user_id);
                Err(redirect())
            }
            Err(e) => {
                error!("{:<12} --> session lookup failed: {}", "Auth", e);
                Err(redirect())
            }
        }
    }
}
