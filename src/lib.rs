//! Warden - users/roles demo with a seeded bootstrap and gated admin API.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod datastore;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod schema;
pub mod telemetry;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use diesel::r2d2::{self, ConnectionManager};
use diesel::PgConnection;
use std::sync::Arc;
use std::time::Duration;

use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use auth::password::PasswordService;
use auth::token::TokenSigner;
use config::BootstrapConfig;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub tokens: Arc<TokenSigner>,
    pub passwords: PasswordService,
    pub registration_enabled: bool,
    pub ui_theme: String,
    /// Guards the once-per-process bootstrap run.
    pub bootstrap: Arc<tokio::sync::OnceCell<()>>,
    pub bootstrap_config: Arc<BootstrapConfig>,
}

impl AppState {
    pub fn new(db_pool: DbPool, config: &Config) -> Self {
        let tokens = TokenSigner::new(
            &config.security.secret_key,
            config.security.access_token_expiry_secs,
        );

        let passwords = PasswordService::new(
            config.security.password_salt.clone(),
            config.security.password_hash_cost,
        );

        Self {
            db_pool,
            tokens: Arc::new(tokens),
            passwords,
            registration_enabled: config.security.registration_enabled,
            ui_theme: config.security.ui_theme.clone(),
            bootstrap: Arc::new(tokio::sync::OnceCell::new()),
            bootstrap_config: Arc::new(config.bootstrap.clone()),
        }
    }
}

pub fn create_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = RequestBodyLimitLayer::new(config.server.max_body_size);
    let timeout = TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let public_routes = Router::new()
        .route("/", get(handlers::index::index))
        .route(
            "/login",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route("/register", post(handlers::auth::register))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/admin/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/admin/users/{user_id}",
            get(handlers::admin::get_user)
                .put(handlers::admin::update_user)
                .delete(handlers::admin::delete_user),
        )
        .route(
            "/admin/users/{user_id}/roles",
            get(handlers::admin::user_roles).post(handlers::admin::assign_role),
        )
        .route(
            "/admin/users/{user_id}/roles/{role_id}",
            delete(handlers::admin::unassign_role),
        )
        .route(
            "/admin/roles",
            get(handlers::admin::list_roles).post(handlers::admin::create_role),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::admin_gate,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(openapi::swagger_router())
        .merge(public_routes)
        .merge(admin_routes)
        .fallback(fallback_handler)
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::bootstrap::bootstrap_middleware,
        ))
        .layer(trace_layer)
        .layer(timeout)
        .layer(body_limit)
        .layer(cors)
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found", "code": "NOT_FOUND"})),
    )
}

pub fn create_db_pool(config: &Config) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(&config.database.url);
    r2d2::Pool::builder()
        .max_size(config.database.max_connections)
        .min_idle(Some(config.database.min_connections))
        .connection_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.database.idle_timeout_secs)))
        .build(manager)
        .expect("Failed to create database pool")
}

pub fn create_db_pool_with_url(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(10)
        .min_idle(Some(2))
        .connection_timeout(Duration::from_secs(30))
        .idle_timeout(Some(Duration::from_secs(600)))
        .build(manager)
        .expect("Failed to create database pool")
}

pub fn init_tracing(config: &Config) {
    telemetry::init_telemetry(config);
}

pub use config::Config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
