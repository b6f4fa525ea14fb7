use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};

use crate::auth::{password, session};
use crate::db;
use crate::models::Role;
use crate::routes::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

pub const NO_SUCH_EMAIL: &str = "no such email";
pub const PASSWORD_INCORRECT: &str = "password incorrect";

#[derive(Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// The login page view model; `error` carries the flash-style reason from a
/// failed attempt.
#[derive(Serialize)]
struct LoginView {
    error: Option<String>,
}

#[derive(Serialize)]
struct RegisterView {
    error: Option<&'static str>,
}

pub async fn login_form(Query(query): Query<LoginQuery>) -> Response {
    success(LoginView { error: query.error }, "Login").into_response()
}

/// Authenticates by exact email match plus bcrypt comparison. Each failure
/// redirects back to the form carrying its named reason; only the user id
/// goes into the session token.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match db::users::find_by_email(&state.pool, &form.email).await? {
        Some(user) => user,
        None => return Ok(login_failure(NO_SUCH_EMAIL)),
    };

    if !password::verify_password(&form.password, &user.password_hash)? {
        return Ok(login_failure(PASSWORD_INCORRECT));
    }

    let token = session::create_token(user.id, &state.config.session_secret)?;
    let cookie = session::session_cookie(&token, state.config.production);

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/events")).into_response())
}

fn login_failure(reason: &str) -> Response {
    tracing::info!(reason, "Login failed");
    let target = format!("/login?error={}", reason.replace(' ', "+"));
    Redirect::to(&target).into_response()
}

pub async fn register_form() -> Response {
    success(RegisterView { error: None }, "Register").into_response()
}

/// Creates a user. An unknown role or a storage failure re-renders the form
/// with an inline error; the plaintext password is hashed before storage and
/// never logged.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let Some(role) = Role::parse(&form.role) else {
        return Ok(register_failure("Invalid role selected"));
    };

    let password_hash = password::hash_password(&form.password)?;

    match db::users::create(
        &state.pool,
        &form.username,
        &form.email,
        &password_hash,
        role.as_str(),
    )
    .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            // Duplicate email lands here too; the client only sees the
            // generic message.
            tracing::error!(error = ?e, "Registration insert failed");
            Ok(register_failure("Registration failed"))
        }
    }
}

fn register_failure(error: &'static str) -> Response {
    success(RegisterView { error: Some(error) }, "Register").into_response()
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = session::clear_session_cookie(state.config.production);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_targets() {
        // The named reason must survive the redirect as a query parameter.
        let response = login_failure(NO_SUCH_EMAIL);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/login?error=no+such+email");

        let response = login_failure(PASSWORD_INCORRECT);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/login?error=password+incorrect");
    }
}
