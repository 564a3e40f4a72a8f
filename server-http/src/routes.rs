use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-gateway-key"),
        ]);

    Router::new()
        // Single gateway endpoint; the operation is selected by `action`
        .route(
            "/",
            get(handlers::dispatch)
                .post(handlers::dispatch)
                .options(handlers::preflight),
        )
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
