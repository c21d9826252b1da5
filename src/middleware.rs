//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::Result;
use crate::user::Principal;

const BEARER: &str = "Bearer ";

/// Resolve the requester into a [`Principal`] for every route.
///
/// A missing, invalid or stale token yields [`Principal::Anonymous`]
/// instead of an error; handlers decide whether anonymity is acceptable.
/// Known users get their `last_seen` bumped as a side effect.
pub async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let principal = match bearer_token(&req) {
        Some(token) => resolve(&state, &token).await,
        None => Principal::Anonymous,
    };

    if let Principal::Known { user, .. } = &principal {
        state.accounts.ping(user.id).await?;
    }

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|token| token.replace(BEARER, ""))
}

async fn resolve(state: &AppState, token: &str) -> Principal {
    let Ok(claims) = state.token.decode(token) else {
        return Principal::Anonymous;
    };
    let Ok(user) = state.accounts.repo.find_by_id(claims.sub).await else {
        return Principal::Anonymous;
    };

    let role = match user.role_id {
        Some(role_id) => state.accounts.roles.find_by_id(role_id).await.ok(),
        None => None,
    };

    Principal::Known { user, role }
}
