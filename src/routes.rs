use crate::docs::ApiDoc;
use crate::state::AppState;
use axum::Router;
use axum::http::HeaderValue;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub fn configure_routes(state: AppState) -> Router<AppState> {
    // Cross-origin access is an explicit allow-list; an empty list leaves it
    // closed.
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(crate::modules::processing::router())
        .route("/health", axum::routing::get(|| async { "ok" }))
        .layer(cors)
}
