//! Administrator profile edit.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::role::Role;
use crate::router::Valid;
use crate::user::{AdminProfileUpdate, Principal, User};

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
    pub confirmed: bool,
    pub role: i32,
    #[validate(length(max = 64, message = "Name must be 0 to 64 characters long."))]
    pub name: String,
    pub about_me: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Form {
    pub user: User,
    /// Assignable roles, for the role select.
    pub roles: Vec<Role>,
}

/// Target profile plus the assignable roles, prefilling the admin form.
pub async fn form(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<Form>> {
    if !principal.is_administrator() {
        return Err(ServerError::Forbidden);
    }

    let user = state.accounts.repo.find_by_id(id).await?;
    let roles = state.accounts.roles.all().await?;

    Ok(Json(Form { user, roles }))
}

/// Handler to rewrite any profile, administrators only.
pub async fn handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>> {
    let user = state
        .accounts
        .edit_profile_as_admin(
            &principal,
            id,
            AdminProfileUpdate {
                email: body.email,
                username: body.username,
                confirmed: body.confirmed,
                role_id: body.role,
                name: body.name,
                about_me: body.about_me,
            },
        )
        .await?;

    Ok(Json(user))
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
    async fn test_admin_edit_requires_admin_bit(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::GET,
            &format!("/edit-profile/{}", user.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = crate::test_admin(&state, "root").await;
        let response = make_request(
            Some((&state, admin.id)),
            app,
            Method::GET,
            &format!("/edit-profile/{}", user.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Form = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.user.username, "someone");
        assert_eq!(body.roles.len(), 3);
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_admin_edit_rejects_duplicate_email(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let a = crate::test_user(&state, "a_user").await;
        let b = crate::test_user(&state, "b_user").await;
        let admin = crate::test_admin(&state, "root").await;

        let req_body = json!({
            "email": a.email,
            "username": b.username,
            "confirmed": true,
            "role": b.role_id,
            "name": "",
            "about_me": null,
        });
        let response = make_request(
            Some((&state, admin.id)),
            app.clone(),
            Method::POST,
            &format!("/edit-profile/{}", b.id),
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let req_body = json!({
            "email": b.email,
            "username": b.username,
            "confirmed": true,
            "role": b.role_id,
            "name": "B",
            "about_me": null,
        });
        let response = make_request(
            Some((&state, admin.id)),
            app,
            Method::POST,
            &format!("/edit-profile/{}", b.id),
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: User = serde_json::from_slice(&body).unwrap();
        assert!(body.confirmed);
        assert_eq!(body.name, "B");
    }
}
