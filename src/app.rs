use crate::config::settings::MAX_UPLOAD_BYTES;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub async fn create_app(state: AppState) -> Router {
    // The size ceiling lives here at the ingress layer; oversized uploads
    // are rejected before intake ever runs.
    crate::routes::configure_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .with_state(state)
}
