//! Instance information page.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::config::Environment;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    name: String,
    url: String,
    version: String,
    environment: Environment,
}

/// Handler for the landing and home pages.
pub async fn handler(State(state): State<AppState>) -> Json<Response> {
    let config = &state.config;

    Json(Response {
        name: config.name.clone(),
        url: config.url.clone(),
        version: config.version().to_owned(),
        environment: config.environment,
    })
}
