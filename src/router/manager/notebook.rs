//! Task creation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::classification::Classification;
use crate::error::Result;
use crate::router::Valid;
use crate::task::{NewTask, Task};
use crate::user::Principal;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 20,
        message = "Title must be 1 to 20 characters long."
    ))]
    pub tarea: String,
    #[validate(length(equal = 1, message = "Tier must be a single letter."))]
    pub tipo: String,
    #[validate(range(min = 0.0, message = "Duration must not be negative."))]
    pub duracion_total: f64,
    pub fecha_inicio: NaiveDate,
    pub fecha_final: NaiveDate,
}

/// The ABC tiers, for the notebook form.
pub async fn tiers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Classification>>> {
    principal.user()?;

    Ok(Json(state.tasks.classifications.list().await?))
}

/// Handler to log a new task.
pub async fn handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Task>)> {
    let user = principal.user()?;

    let task = state
        .tasks
        .create_task(
            user,
            NewTask {
                tarea: body.tarea,
                tipo: body.tipo,
                duracion_total: body.duracion_total,
                fecha_inicio: body.fecha_inicio,
                fecha_final: body.fecha_final,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
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
    async fn test_notebook_handler(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;

        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::GET,
            "/manager_app/notebook",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let tiers: Vec<Classification> = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            tiers.iter().map(|t| t.tipo.as_str()).collect::<Vec<_>>(),
            ["A", "B", "C"]
        );

        let req_body = json!({
            "tarea": "write report",
            "tipo": "A",
            "duracion_total": 5.0,
            "fecha_inicio": "2024-01-01",
            "fecha_final": "2024-01-10",
        });
        let response = make_request(
            Some((&state, user.id)),
            app.clone(),
            Method::POST,
            "/manager_app/notebook",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let task: Task = serde_json::from_slice(&body).unwrap();
        assert_eq!(task.tarea, "Write Report");
        assert_eq!(task.usuario, user.id);
        assert_eq!(task.tiempo_empleado, 0.0);
        assert!(!task.finalizada);
    }

    #[sqlx::test]
    #[ignore = "requires a postgres instance"]
    async fn test_notebook_rejects_inverted_dates(pool: Pool<Postgres>) {
        let state = test_state(pool).await;
        let app = app(state.clone());

        let user = crate::test_user(&state, "someone").await;

        let req_body = json!({
            "tarea": "write report",
            "tipo": "A",
            "duracion_total": 5.0,
            "fecha_inicio": "2024-01-10",
            "fecha_final": "2024-01-05",
        });
        let response = make_request(
            Some((&state, user.id)),
            app,
            Method::POST,
            "/manager_app/notebook",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
