use crate::common::response::{ApiError, ErrorBody};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};

use super::dto::{ProcessResponse, ThumbnailResponse};
use super::service::ProcessingService;

/// Transcode an uploaded video to the standard delivery profile.
/// The processed MP4 and a best-effort thumbnail come back inline as data URIs.
#[utoipa::path(
    post,
    path = "/process",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video processed", body = ProcessResponse),
        (status = 400, description = "No video file in the request", body = ErrorBody),
        (status = 500, description = "Engine or storage failure", body = ErrorBody)
    ),
    tag = "Processing"
)]
pub async fn process_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    match ProcessingService::process(state, multipart).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Extract a single still frame from an uploaded video.
#[utoipa::path(
    post,
    path = "/thumbnail",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail extracted", body = ThumbnailResponse),
        (status = 400, description = "No video file in the request", body = ErrorBody),
        (status = 500, description = "Engine or storage failure", body = ErrorBody)
    ),
    tag = "Processing"
)]
pub async fn extract_thumbnail(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    match ProcessingService::thumbnail(state, multipart).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::app::create_app;
    use crate::config::settings::AppConfig;
    use crate::infrastructure::media::engine::MediaEngine;
    use crate::state::AppState;

    const BOUNDARY: &str = "videoforge-test-boundary";

    async fn test_app(ffmpeg_path: &str, upload_dir: &Path, output_dir: &Path) -> Router {
        let config = AppConfig {
            server_port: 0,
            upload_dir: upload_dir.display().to_string(),
            output_dir: output_dir.display().to_string(),
            ffmpeg_path: ffmpeg_path.to_string(),
            transcode_timeout: Duration::from_secs(5),
            allowed_origins: vec!["http://allowed.example".to_string()],
        };
        let engine = MediaEngine::new(&config.ffmpeg_path, config.transcode_timeout);
        create_app(AppState::new(config, engine)).await
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn video_part(bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: video/mp4\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn empty_form() -> Vec<u8> {
        format!("--{BOUNDARY}--\r\n").into_bytes()
    }

    fn dir_is_empty(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn process_without_file_is_400_and_creates_no_temp_files() {
        let uploads = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let app = test_app("ffmpeg", uploads.path(), outputs.path()).await;

        let response = app
            .oneshot(multipart_request("/process", empty_form()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "no video file uploaded");
        assert!(body["details"].is_string());
        assert!(body["timestamp"].is_string());
        assert!(dir_is_empty(uploads.path()));
        assert!(dir_is_empty(outputs.path()));
    }

    #[tokio::test]
    async fn thumbnail_without_file_is_400() {
        let uploads = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let app = test_app("ffmpeg", uploads.path(), outputs.path()).await;

        let response = app
            .oneshot(multipart_request("/thumbnail", empty_form()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "no video file uploaded");
        assert!(dir_is_empty(uploads.path()));
    }

    #[tokio::test]
    async fn engine_failure_is_500_and_releases_temp_files() {
        let uploads = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        // A binary that cannot be spawned stands in for a failing engine.
        let app = test_app(
            "/nonexistent/videoforge-missing-ffmpeg",
            uploads.path(),
            outputs.path(),
        )
        .await;

        let response = app
            .oneshot(multipart_request("/process", video_part(b"not really mp4")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "video processing failed");
        assert!(dir_is_empty(uploads.path()));
        assert!(dir_is_empty(outputs.path()));
    }

    #[tokio::test]
    async fn standalone_thumbnail_engine_failure_is_500_and_releases_temp_files() {
        let uploads = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let app = test_app(
            "/nonexistent/videoforge-missing-ffmpeg",
            uploads.path(),
            outputs.path(),
        )
        .await;

        let response = app
            .oneshot(multipart_request("/thumbnail", video_part(b"bytes")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "thumbnail generation failed");
        assert!(dir_is_empty(uploads.path()));
        assert!(dir_is_empty(outputs.path()));
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let uploads = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let app = test_app("ffmpeg", uploads.path(), outputs.path()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_only_listed_origins() {
        let uploads = tempfile::tempdir().unwrap();
        let outputs = tempfile::tempdir().unwrap();
        let app = test_app("ffmpeg", uploads.path(), outputs.path()).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://allowed.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .map(|v| v.to_str().unwrap()),
            Some("http://allowed.example")
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://other.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
