//! Authentication-related HTTP API.

pub mod confirm;
pub mod email;
pub mod login;
pub mod password;
pub mod register;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /auth/register` goes to `register`.
        .route("/register", post(register::handler))
        // `POST /auth/login` goes to `login`.
        .route("/login", post(login::handler))
        // Confirmation: apply a token, or resend the email.
        .route("/confirm/{token}", get(confirm::handler))
        .route("/confirm", post(confirm::resend))
        // Password reset: request a token, then apply it.
        .route("/reset", post(password::request))
        .route("/reset/{token}", post(password::reset))
        // Email change: request a token, then apply it.
        .route("/change_email", post(email::request))
        .route("/change_email/{token}", get(email::apply))
        // `POST /auth/change_password`. Authorization required.
        .route("/change_password", post(password::change))
}
