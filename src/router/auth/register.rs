//! Account creation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::token::SESSION_EXPIRY;
use crate::user::UserBuilder;

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(
        length(min = 1, max = 64),
        email(message = "Email must be formatted.")
    )]
    pub email: String,
    #[validate(
        length(min = 1, max = 64),
        custom(
            function = "crate::router::validate_username",
            message = "Usernames must have only letters, numbers, dots or underscores."
        )
    )]
    pub username: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    password: String,
    #[validate(length(max = 64))]
    name: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub token_type: String,
    pub token: String,
    pub expires_in: u64,
}

/// Handler to create user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Response>)> {
    let new = UserBuilder::new()
        .email(body.email)
        .username(body.username)
        .password(body.password)
        .name(body.name.unwrap_or_default())
        .build();

    let user = state.accounts.register(new).await?;
    let token = state.token.create(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(Response {
            token_type: TOKEN_TYPE.to_owned(),
            token,
            expires_in: SESSION_EXPIRY,
        }),
    ))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use super::*;
    use crate::{app, make_request, test_state};

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_register_handler(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let req_body = json!({
            "email": "someone@example.com",
            "username": "someone",
            "password": "StRong_Pa$$W0rD",
        });
        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/auth/register",
            req_body.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.token_type, TOKEN_TYPE);
        assert!(state.token.decode(&body.token).is_ok());

        // Same email again: per-field conflict.
        let req_body = json!({
            "email": "someone@example.com",
            "username": "other",
            "password": "StRong_Pa$$W0rD",
        });
        let response = make_request(
            None,
            app,
            Method::POST,
            "/auth/register",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_register_rejects_bad_username(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state);

        let req_body = json!({
            "email": "someone@example.com",
            "username": "2 invalid",
            "password": "StRong_Pa$$W0rD",
        });
        let response = make_request(
            None,
            app,
            Method::POST,
            "/auth/register",
            req_body.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
