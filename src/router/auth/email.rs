//! Email change.

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
pub struct Body {
    #[validate(email(message = "Email must be formatted."))]
    new_email: String,
    #[validate(length(min = 1))]
    password: String,
}

/// Email a change-email token to the new address, password gated.
pub async fn request(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Valid(body): Valid<Body>,
) -> Result<StatusCode> {
    let user = principal.user()?;
    state
        .accounts
        .request_email_change(user, &body.new_email, &body.password)
        .await?;

    Ok(StatusCode::ACCEPTED)
}

/// Apply a pending email change to the acting user.
pub async fn apply(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    let user = principal.user()?;
    state.accounts.change_email(user, &token).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use crate::crypto::avatar_hash;
    use crate::{app, make_request, test_state};

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_change_email_flow(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::POST,
            "/auth/change_email",
            json!({
                "new_email": "new@example.com",
                "password": "StRong_Pa$$W0rD",
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        // The handler only queues an email; forge the token it would carry.
        let token = state
            .token
            .issue(
                crate::token::Intent::ChangeEmail {
                    change_email: user.id,
                    new_email: "new@example.com".into(),
                },
                crate::token::DEFAULT_EXPIRY,
            )
            .unwrap();
        let response = make_request(
            Some((&state, user.id)),
            app,
            Method::GET,
            &format!("/auth/change_email/{token}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let updated = state.accounts.repo.find_by_id(user.id).await.unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(
            updated.avatar_hash.as_deref(),
            Some(avatar_hash("new@example.com").as_str())
        );
    }
}
