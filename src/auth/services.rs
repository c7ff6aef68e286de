use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{jwt::JwtKeys, password::Passwords, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Column width of `users.email`.
const MAX_EMAIL_LEN: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.chars().count() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// An address already on file rejects the registration.
pub(crate) fn ensure_unregistered(existing: Option<&User>) -> Result<(), AppError> {
    match existing {
        Some(u) => {
            warn!(user_id = u.id, "email already registered");
            Err(AppError::EmailTaken)
        }
        None => Ok(()),
    }
}

/// `None` from the insert means the unique constraint fired under a concurrent signup.
pub(crate) fn inserted(created: Option<User>) -> Result<User, AppError> {
    created.ok_or_else(|| {
        warn!("email registered concurrently");
        AppError::EmailTaken
    })
}

/// Emails are stored exactly as given; no case folding or trimming.
#[instrument(skip(state, password))]
pub async fn register(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    if !is_valid_email(email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if password.is_empty() {
        return Err(AppError::validation("Password must not be empty"));
    }

    let existing = User::find_by_email(&state.db, email).await?;
    ensure_unregistered(existing.as_ref())?;

    let hash = state.passwords.hash(password)?;
    let user = inserted(User::create(&state.db, email, &hash).await?)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Same outcome and comparable cost whether the email or the password is wrong.
pub(crate) fn check_credentials(
    passwords: &Passwords,
    user: Option<User>,
    password: &str,
) -> Result<User, AppError> {
    match user {
        Some(u) if passwords.verify(password, &u.password_hash) => Ok(u),
        Some(u) => {
            warn!(user_id = u.id, "login invalid password");
            Err(AppError::InvalidCredentials)
        }
        None => {
            passwords.verify_dummy(password);
            warn!("login unknown email");
            Err(AppError::InvalidCredentials)
        }
    }
}

/// Verifies credentials and issues a session token.
#[instrument(skip(state, password))]
pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(User, String), AppError> {
    let found = User::find_by_email(&state.db, email).await?;
    let user = check_credentials(&state.passwords, found, password)?;

    let token = JwtKeys::from_ref(state).sign(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok((user, token))
}
