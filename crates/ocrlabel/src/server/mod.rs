mod error;
mod labels;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

use ocrlabel_core::LabelStore;

/// Mount point for raw image files; `image_url` values point here.
pub(crate) const FILES_ROUTE: &str = "/files";

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub store: Arc<LabelStore>,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    // Only reflect an origin when it is in the allow-list. Otherwise, omit
    // the header entirely so browsers get a clean CORS rejection.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let images = ServeDir::new(state.store.root());
    let shared = Arc::new(state);

    // A label is one line of text; anything near this size is abuse.
    const LABEL_BODY_LIMIT: usize = 64 * 1024;

    let label_routes = Router::new()
        .route("/labels", get(labels::list_labels))
        .route(
            "/labels/{filename}",
            get(labels::get_label).post(labels::set_label),
        )
        .route("/refresh", post(labels::refresh_labels))
        .layer(DefaultBodyLimit::max(LABEL_BODY_LIMIT));

    Router::new()
        .route("/health", get(health))
        .merge(label_routes)
        .nest_service(FILES_ROUTE, images)
        .fallback(not_found)
        .layer(cors)
        .with_state(shared)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    data_dir: String,
}

async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let data_dir = state.store.root().display().to_string();
    if state.store.is_available() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                data_dir,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                data_dir,
            }),
        )
    }
}

async fn not_found() -> error::AppError {
    error::AppError::NotFound("route not found".to_string())
}
