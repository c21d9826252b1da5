//! Agenda is a lightweight account manager with an ABC task notebook.

#![forbid(unsafe_code)]

pub mod classification;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod mail;
mod middleware;
pub mod role;
mod router;
pub mod task;
pub mod telemetry;
pub mod token;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
pub use error::ServerError;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub crypto: Arc<crypto::Crypto>,
    pub token: token::TokenManager,
    pub mail: mail::MailManager,
    pub accounts: user::AccountService,
    pub tasks: task::TaskService,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /` and `GET /home` go to the instance page.
        .route("/", get(router::status::handler))
        .route("/home", get(router::status::handler))
        // `GET /user/{username}` goes to the public profile.
        .route("/user/{username}", get(router::users::get::handler))
        // Self-service profile edit. Authorization required.
        .route(
            "/edit-profile",
            get(router::users::update::form).post(router::users::update::handler),
        )
        // Administrator profile edit.
        .route(
            "/edit-profile/{id}",
            get(router::users::admin::form).post(router::users::admin::handler),
        )
        .nest("/auth", router::auth::router())
        .nest("/manager_app", router::manager::router())
        // Resolve every request to a principal, anonymous included.
        .route_layer(AxumMiddleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ))
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read()?;

    let db = match config.postgres {
        Some(ref config) => database::Database::new(config).await?,
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            std::process::exit(0);
        },
    };

    // execute migrations scripts on start.
    sqlx::migrate!().run(&db.postgres).await?;

    let crypto = Arc::new(crypto::Crypto::new(config.argon2.clone())?);

    // handle token signing.
    let Some(secret) = config.secret.clone() else {
        tracing::warn!(
            "missing `secret` entry on `config.yaml` file and `SECRET_KEY` env"
        );
        std::process::exit(0);
    };
    let token = token::TokenManager::new(&config.url, &secret);

    // handle mail sender.
    let mail = if let Some(cfg) = &config.mail {
        mail::MailManager::new(cfg)?
    } else {
        mail::MailManager::default()
    };

    // seed reference data. runs on every deployment.
    let roles = role::RoleRepository::new(db.postgres.clone());
    roles.seed().await?;
    let classifications =
        classification::ClassificationRegistry::new(db.postgres.clone());
    classifications.seed().await?;

    let accounts = user::AccountService::new(
        user::UserRepository::new(db.postgres.clone()),
        roles,
        Arc::clone(&crypto),
        token.clone(),
        mail.clone(),
        config.admin_email.clone(),
    );
    let tasks = task::TaskService::new(
        task::TaskRepository::new(db.postgres.clone()),
        classifications,
    );

    Ok(AppState {
        config,
        db,
        crypto,
        token,
        mail,
        accounts,
        tasks,
    })
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub(crate) async fn make_request(
    auth: Option<(&AppState, i32)>,
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let token = match auth {
        Some((state, user_id)) => {
            state.token.create(user_id).expect("cannot create JWT")
        },
        None => String::default(),
    };

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, token)
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Seeded state over a test pool.
#[cfg(test)]
pub(crate) async fn test_state(pool: sqlx::PgPool) -> AppState {
    let roles = role::RoleRepository::new(pool.clone());
    roles.seed().await.unwrap();
    let classifications =
        classification::ClassificationRegistry::new(pool.clone());
    classifications.seed().await.unwrap();

    let crypto =
        Arc::new(crypto::Crypto::new(Some(crypto::test_params())).unwrap());
    let token =
        token::TokenManager::new("https://agenda.example.com/", "secret");
    let mail = mail::MailManager::default();

    let accounts = user::AccountService::new(
        user::UserRepository::new(pool.clone()),
        roles,
        Arc::clone(&crypto),
        token.clone(),
        mail.clone(),
        Some("root@example.com".into()),
    );
    let tasks = task::TaskService::new(
        task::TaskRepository::new(pool.clone()),
        classifications,
    );

    AppState {
        config: Arc::new(config::Configuration::default()),
        db: database::Database { postgres: pool },
        crypto,
        token,
        mail,
        accounts,
        tasks,
    }
}

#[cfg(test)]
pub(crate) async fn test_user(state: &AppState, username: &str) -> user::User {
    state
        .accounts
        .register(
            user::UserBuilder::new()
                .email(format!("{username}@example.com"))
                .username(username)
                .password("StRong_Pa$$W0rD")
                .build(),
        )
        .await
        .unwrap()
}

/// Registers with the admin email configured by [`test_state`].
#[cfg(test)]
pub(crate) async fn test_admin(state: &AppState, username: &str) -> user::User {
    state
        .accounts
        .register(
            user::UserBuilder::new()
                .email("root@example.com")
                .username(username)
                .password("StRong_Pa$$W0rD")
                .build(),
        )
        .await
        .unwrap()
}
