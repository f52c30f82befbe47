//! Route handlers for registering, logging in and managing the current user.

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    extract::ApiJson,
    response::{ApiResponse, MessageResponse},
    user::{User, UserID, UserStore},
};

/// The data for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    name: String,
    email: String,
    password: String,
}

/// The credentials for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    email: String,
    password: String,
}

/// The new details for the current user.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    name: String,
    email: String,
}

/// The data for changing the current user's password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForm {
    old_password: String,
    new_password: String,
}

fn parse_email(raw_email: &str) -> Result<String, Error> {
    let email = raw_email.trim();

    if EmailAddress::is_valid(email) {
        Ok(email.to_owned())
    } else {
        Err(Error::InvalidEmail(email.to_owned()))
    }
}

fn parse_name(raw_name: &str, min_length: usize) -> Result<String, Error> {
    let name = raw_name.trim();

    if name.chars().count() < min_length {
        return Err(Error::Validation(format!(
            "Name must be at least {min_length} character{}",
            if min_length == 1 { "" } else { "s" }
        )));
    }

    Ok(name.to_owned())
}

/// Create a new user, log them in and return the user.
pub async fn register_user(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<impl IntoResponse, Error> {
    let name = parse_name(&form.name, 1)?;
    let email = parse_email(&form.email)?;
    let password = ValidatedPassword::new(&form.password)?;

    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| tracing::error!("Could not hash password: {error}"))?;

    let user = state.user_store.create(&name, &email, password_hash)?;
    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, ApiResponse::success(user)))
}

/// Check the user's credentials and start a session if they are correct.
pub async fn log_in(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(form): ApiJson<LogInForm>,
) -> Result<impl IntoResponse, Error> {
    let user = match state.user_store.get_by_email(form.email.trim()) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(&form.password)? {
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((jar, ApiResponse::success(user)))
}

/// End the current session.
pub async fn log_out(jar: PrivateCookieJar) -> impl IntoResponse {
    (
        invalidate_auth_cookie(jar),
        MessageResponse::success("Logged out successfully"),
    )
}

/// Get the logged in user.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
) -> Result<ApiResponse<User>, Error> {
    state.user_store.get(user_id).map(ApiResponse::success)
}

/// Change the logged in user's name and email.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<ProfileForm>,
) -> Result<ApiResponse<User>, Error> {
    let name = parse_name(&form.name, 2)?;
    let email = parse_email(&form.email)?;

    state
        .user_store
        .update_profile(user_id, &name, &email)
        .map(ApiResponse::success)
}

/// Change the logged in user's password after checking their current password.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<PasswordForm>,
) -> Result<MessageResponse, Error> {
    let user = state.user_store.get(user_id)?;

    if !user.password_hash.verify(&form.old_password)? {
        return Err(Error::IncorrectPassword);
    }

    let new_password = ValidatedPassword::new(&form.new_password)?;
    let password_hash = PasswordHash::new(new_password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| tracing::error!("Could not hash password: {error}"))?;

    state.user_store.update_password(user_id, &password_hash)?;
    tracing::info!("Changed password for user {user_id}");

    Ok(MessageResponse::success("Password updated successfully"))
}
