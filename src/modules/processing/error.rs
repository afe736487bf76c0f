use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the processing pipeline. `Thumbnail` is recoverable
/// when a transcode already succeeded; everything else aborts the request.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("{0}")]
    MissingFile(String),
    #[error("{0}")]
    Transcode(String),
    #[error("{0}")]
    Thumbnail(String),
    #[error("io error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ProcessingError {
    /// Stable machine-readable label carried in the `error` field of error
    /// responses.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingError::MissingFile(_) => "no video file uploaded",
            ProcessingError::Transcode(_) => "video processing failed",
            ProcessingError::Thumbnail(_) => "thumbnail generation failed",
            ProcessingError::Filesystem { .. } => "storage failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProcessingError::MissingFile(_) => StatusCode::BAD_REQUEST,
            ProcessingError::Transcode(_)
            | ProcessingError::Thumbnail(_)
            | ProcessingError::Filesystem { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
