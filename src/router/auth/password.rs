//! Password reset and change.

use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::Principal;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestBody {
    #[validate(email(message = "Email must be formatted."))]
    email: String,
}

/// Email a reset token.
///
/// Answers 202 whether or not the address belongs to an account.
pub async fn request(
    State(state): State<AppState>,
    Valid(body): Valid<RequestBody>,
) -> Result<StatusCode> {
    state.accounts.request_password_reset(&body.email).await?;

    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResetBody {
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    password: String,
}

/// Set a new password from a reset token.
pub async fn reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Valid(body): Valid<ResetBody>,
) -> Result<StatusCode> {
    state.accounts.reset_password(&token, &body.password).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ChangeBody {
    #[validate(length(min = 1))]
    old_password: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    password: String,
}

/// Replace the password of the acting user.
pub async fn change(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Valid(body): Valid<ChangeBody>,
) -> Result<StatusCode> {
    let user = principal.user()?;
    state
        .accounts
        .change_password(user, &body.old_password, &body.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
