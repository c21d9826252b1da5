//! Manager-app HTTP API: the ABC task notebook and agenda.

pub mod agenda;
pub mod notebook;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /manager_app/notebook` lists the tiers for the form,
        // `POST` creates a task.
        .route("/notebook", get(notebook::tiers).post(notebook::handler))
        // `GET /manager_app/agenda` lists the requester's tasks.
        .route("/agenda", get(agenda::handler).post(agenda::handler))
        .route("/agenda/update/{id}", post(agenda::update))
        .route("/agenda/delete/{id}", post(agenda::delete))
}
