//! Public profile view.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{Result, ServerError};

const AVATAR_SIZE: u16 = 100;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub username: String,
    pub name: String,
    pub about_me: Option<String>,
    pub confirmed: bool,
    pub member_since: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub avatar: String,
}

/// Handler to view a profile by username.
pub async fn handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Response>> {
    let user = state
        .accounts
        .repo
        .find_by_username(&username)
        .await?
        .ok_or(ServerError::NotFound("user"))?;

    Ok(Json(Response {
        avatar: user.gravatar(AVATAR_SIZE),
        username: user.username,
        name: user.name,
        about_me: user.about_me,
        confirmed: user.confirmed,
        member_since: user.member_since,
        last_seen: user.last_seen,
    }))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use super::*;
    use crate::{app, make_request, test_state};

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_get_profile_handler(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        crate::test_user(&state, "someone").await;

        let response = make_request(
            None,
            app.clone(),
            Method::GET,
            "/user/someone",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.username, "someone");
        assert!(body.avatar.starts_with("https://secure.gravatar.com/avatar/"));

        let response = make_request(
            None,
            app,
            Method::GET,
            "/user/nobody",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
