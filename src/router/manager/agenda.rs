//! Task list, progress updates and deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::task::Task;
use crate::user::Principal;

/// Handler to list the requester's tasks, in insertion order.
pub async fn handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Task>>> {
    let user = principal.user()?;

    Ok(Json(state.tasks.list_tasks(user).await?))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(range(min = 0.0, message = "Time spent must not be negative."))]
    pub tiempo_empleado: f64,
    pub finalizada: bool,
}

/// Handler to apply a progress update to one task.
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Valid(body): Valid<Body>,
) -> Result<Json<Task>> {
    let user = principal.user()?;

    let task = state
        .tasks
        .update_progress(user, id, body.tiempo_empleado, body.finalizada)
        .await?;

    Ok(Json(task))
}

/// Handler to delete one task.
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let user = principal.user()?;
    state.tasks.delete_task(user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use super::*;
    use crate::{app, make_request, test_state};

    async fn create_task(state: &crate::AppState, user_id: i32) -> Task {
        let app = crate::app(state.clone());
        let req_body = json!({
            "tarea": "write report",
            "tipo": "A",
            "duracion_total": 5.0,
            "fecha_inicio": "2024-01-01",
            "fecha_final": "2024-01-10",
        });
        let response = make_request(
            Some((state, user_id)),
            app,
            Method::POST,
            "/manager_app/notebook",
            req_body.to_string(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_agenda_flow(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;
        let task = create_task(&state, user.id).await;

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::GET,
            "/manager_app/agenda",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let listed: Vec<Task> = serde_json::from_slice(&body).unwrap();
        assert_eq!(listed, vec![task.clone()]);

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::POST,
            &format!("/manager_app/agenda/update/{}", task.id),
            json!({ "tiempo_empleado": 2.5, "finalizada": true }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let updated: Task = serde_json::from_slice(&body).unwrap();
        assert_eq!(updated.tiempo_empleado, 2.5);
        assert!(updated.finalizada);

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::POST,
            &format!("/manager_app/agenda/delete/{}", task.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = make_request(
            Some((&state, user.id)),
            app,
            Method::GET,
            "/manager_app/agenda",
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let listed: Vec<Task> = serde_json::from_slice(&body).unwrap();
        assert!(listed.is_empty());
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_agenda_is_owner_scoped(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let owner = crate::test_user(&state, "someone").await;
        let other = crate::test_user(&state, "other").await;
        let task = create_task(&state, owner.id).await;

        let response = make_request(
            Some((&state, other.id)),
            app.clone(),
            Method::POST,
            &format!("/manager_app/agenda/update/{}", task.id),
            json!({ "tiempo_empleado": 1.0, "finalizada": false }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = make_request(
            Some((&state, other.id)),
            app,
            Method::POST,
            &format!("/manager_app/agenda/delete/{}", task.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
