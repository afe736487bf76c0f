use axum::Router;
use axum::routing::post;

use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process", post(handler::process_video))
        .route("/thumbnail", post(handler::extract_thumbnail))
}
