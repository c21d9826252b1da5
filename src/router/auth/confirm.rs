//! Account confirmation.

use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::error::Result;
use crate::user::Principal;

/// Apply a confirmation token to the acting user.
///
/// Already-confirmed accounts are a no-op, matching a re-clicked link.
pub async fn handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    let user = principal.user()?;
    if user.confirmed {
        return Ok(StatusCode::NO_CONTENT);
    }

    state.accounts.confirm(user, &token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a fresh confirmation email to the acting user.
pub async fn resend(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<StatusCode> {
    state.accounts.resend_confirmation(principal.user()?)?;

    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use sqlx::{Pool, Postgres};

    use crate::token::{DEFAULT_EXPIRY, Intent};
    use crate::{app, make_request, test_state};

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_confirm_handler(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;
        let token = state
            .token
            .issue(Intent::Confirm { confirm: user.id }, DEFAULT_EXPIRY)
            .unwrap();

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::GET,
            &format!("/auth/confirm/{token}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let confirmed = state.accounts.repo.find_by_id(user.id).await.unwrap();
        assert!(confirmed.confirmed);

        // Anonymous requesters cannot confirm anything.
        let response = make_request(
            None,
            app,
            Method::GET,
            &format!("/auth/confirm/{token}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_confirm_rejects_foreign_token(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;
        let other = crate::test_user(&state, "other").await;
        let token = state
            .token
            .issue(Intent::Confirm { confirm: other.id }, DEFAULT_EXPIRY)
            .unwrap();

        let response = make_request(
            Some((&state, user.id)),
            app,
            Method::GET,
            &format!("/auth/confirm/{token}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let untouched = state.accounts.repo.find_by_id(user.id).await.unwrap();
        assert!(!untouched.confirmed);
    }
}
