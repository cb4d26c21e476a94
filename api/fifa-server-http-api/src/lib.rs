use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use fifa_server_app::Application;
use log::info;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::jwt::Keys;

mod export;
pub mod jwt;
mod players;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_IMPORT_TIMEOUT_SECS: u64 = 60;
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
    pub keys: Arc<Keys>,
    /// Deadline for a single CSV import request.
    pub import_timeout: Duration,
}

pub fn router(state: AppState, cors: Option<CorsLayer>) -> Router {
    let mut router = Router::new()
        .route("/players", get(players::search).post(players::create))
        .route("/players/export.csv", get(players::export_csv))
        .route("/players/import", post(players::import_text))
        .route("/players/import-file", post(players::import_file))
        .route(
            "/players/{id}",
            get(players::get_by_id)
                .put(players::update)
                .delete(players::delete),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("FIFA_CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    Some(cors.allow_origin(AllowOrigin::list(origins)))
}

pub async fn run(
    app: Arc<Application>,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let port = std::env::var("FIFA_HTTP_PORT")
        .expect("FIFA_HTTP_PORT must be set")
        .parse::<u16>()
        .expect("FIFA_HTTP_PORT must be a valid u16");
    let host = std::env::var("FIFA_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let import_timeout = std::env::var("FIFA_IMPORT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_IMPORT_TIMEOUT_SECS));

    let state = AppState {
        app,
        keys: Arc::new(Keys::from_env()),
        import_timeout,
    };
    let router = router(state, build_cors_layer_from_env());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .expect("Failed to bind HTTP listener");

    info!("HTTP API listening on {}:{}", host, port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .expect("HTTP server failed");

    info!("HTTP API shut down gracefully");
}

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        log::debug!("Request failed: {}", self);
        let (status, msg) = match self {
            ServiceError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            ServiceError::Unauthorized(msg) => (axum::http::StatusCode::UNAUTHORIZED, msg),
            ServiceError::BadRequest(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}
