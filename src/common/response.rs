use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::modules::processing::error::ProcessingError;

/// Error envelope shared by every failing endpoint: a stable `error` label,
/// the underlying diagnostic, and when the failure happened. Never carries a
/// stack trace.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
    pub timestamp: String,
}

pub struct ApiError(pub StatusCode, pub ErrorBody);

impl ApiError {
    pub fn new(status: StatusCode, error: &str, details: String) -> Self {
        Self(
            status,
            ErrorBody {
                error: error.to_string(),
                details,
                timestamp: now_rfc3339(),
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = (self.0, self.1);
        (status, Json(body)).into_response()
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        ApiError::new(err.status(), err.label(), err.to_string())
    }
}

/// RFC 3339 UTC timestamp used in every response body.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_rfc3339() {
        let stamp = now_rfc3339();
        assert!(time::OffsetDateTime::parse(
            &stamp,
            &time::format_description::well_known::Rfc3339
        )
        .is_ok());
    }

    #[test]
    fn error_body_shape() {
        let err = ApiError::new(StatusCode::BAD_REQUEST, "no video file uploaded", "x".into());
        let json = serde_json::to_value(&err.1).unwrap();
        assert_eq!(json["error"], "no video file uploaded");
        assert_eq!(json["details"], "x");
        assert!(json["timestamp"].is_string());
    }
}
