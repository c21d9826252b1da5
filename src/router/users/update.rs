//! Self-service profile edit.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::user::Principal;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(max = 64, message = "Name must be 0 to 64 characters long."))]
    pub name: String,
    pub about_me: Option<String>,
}

/// Current profile fields, prefilling the edit form.
pub async fn form(
    Extension(principal): Extension<Principal>,
) -> Result<Json<Body>> {
    let user = principal.user()?;

    Ok(Json(Body {
        name: user.name.clone(),
        about_me: user.about_me.clone(),
    }))
}

/// Handler to update display name and bio.
pub async fn handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Valid(body): Valid<Body>,
) -> Result<StatusCode> {
    let user = principal.user()?;
    state
        .accounts
        .edit_profile(user, &body.name, body.about_me.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
