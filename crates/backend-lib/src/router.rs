// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router.
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{auth, clock};
use crate::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/{employee_no}/change-password", post(auth::change_password))
        .route("/api/clock/{employee_no}/clock-in", post(clock::clock_in))
        .route("/api/clock/{employee_no}/clock-out", post(clock::clock_out))
        .route("/api/clock/{employee_no}/clock-in-status", get(clock::clock_in_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparsable CORS origin");
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
