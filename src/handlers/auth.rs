// region:    --- Imports
use crate::app::AppState;
use crate::auth::extract::safe_next;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session;
use crate::error::AppError;
use crate::store::StoreError;
use crate::views;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, warn};

// endregion: --- Imports

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}

fn login_failed(message: &str, next: Option<&str>) -> Response {
    (StatusCode::BAD_REQUEST, Html(views::login_page(Some(message), next))).into_response()
}

fn register_failed(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Html(views::register_page(Some(message)))).into_response()
}

/// Login page
pub async fn login_form(Query(query): Query<NextQuery>) -> Html<String> {
    Html(views::login_page(None, query.next.as_deref()))
}

/// Login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    info!("{:<12} --> login: {}", "Auth", username);

    let credentials = state.store.find_credentials(username).await?;
    match credentials {
        Some(credentials) if verify_password(&form.password, &credentials.password_hash) => {
            let jar = state
                .sessions
                .login(jar, credentials.id, &credentials.username)?;
            let next = safe_next(form.next.as_deref()).to_string();
            Ok((jar, Redirect::to(&next)).into_response())
        }
        _ => {
            warn!("{:<12} --> login failed: {}", "Auth", username);
            Ok(login_failed(
                "Invalid username and/or password.",
                form.next.as_deref(),
            ))
        }
    }
}

/// Logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::logout(jar), Redirect::to("/"))
}

/// Registration page
pub async fn register_form() -> Html<String> {
    Html(views::register_page(None))
}

/// Register and sign in
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    info!("{:<12} --> register: {}", "Auth", username);

    if username.is_empty() {
        return Ok(register_failed("Username is required."));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Ok(register_failed(&format!(
            "Username must be at most {MAX_USERNAME_LEN} characters."
        )));
    }
    let email = form.email.trim();
    if email.chars().count() > MAX_EMAIL_LEN {
        return Ok(register_failed(&format!(
            "Email must be at most {MAX_EMAIL_LEN} characters."
        )));
    }
    if form.password.is_empty() {
        return Ok(register_failed("Password is required."));
    }
    if form.password != form.confirmation {
        return Ok(register_failed("Passwords must match."));
    }

    let password_hash = hash_password(&form.password)?;
    let user = match state
        .store
        .create_user(username, email, &password_hash)
        .await
    {
        Ok(user) => user,
        Err(StoreError::UsernameTaken) => {
            warn!("{:<12} --> username taken: {}", "Auth", username);
            return Ok(register_failed("Username already taken."));
        }
        Err(e) => return Err(e.into()),
    };

    let jar = state.sessions.login(jar, user.id, &user.username)?;
    Ok((jar, Redirect::to("/")).into_response())
}
