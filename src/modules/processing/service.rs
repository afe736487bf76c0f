use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use tracing::{info, warn};

use super::dto::{ProcessResponse, ThumbnailResponse, to_data_uri};
use super::error::ProcessingError;
use super::model::{DELIVERY_PROFILE, ProcessingJob, TempFiles};
use crate::common::response::now_rfc3339;
use crate::common::upload::{IntakeResult, accept_upload};
use crate::state::AppState;

pub struct ProcessingService;

impl ProcessingService {
    /// Full pipeline: intake, transcode, best-effort thumbnail, inline
    /// payload assembly. Every temp path is registered up front and released
    /// exactly once, whatever the outcome.
    pub async fn process(
        state: AppState,
        multipart: Multipart,
    ) -> Result<ProcessResponse, ProcessingError> {
        let intake = accept_upload(multipart, Path::new(&state.config.upload_dir)).await?;

        let mut temps = TempFiles::new();
        let result = Self::run_pipeline(&state, intake, &mut temps).await;
        temps.release().await;
        result
    }

    async fn run_pipeline(
        state: &AppState,
        intake: IntakeResult,
        temps: &mut TempFiles,
    ) -> Result<ProcessResponse, ProcessingError> {
        let IntakeResult {
            asset,
            overlay_text,
        } = intake;

        let job = ProcessingJob::new(
            asset.path.clone(),
            Path::new(&state.config.output_dir),
            overlay_text,
        );
        temps.register(&job.input);
        temps.register(&job.output);
        temps.register(&job.thumbnail);

        info!(
            "Processing {} ({} bytes, {})",
            asset.name, asset.size, asset.content_type
        );

        state
            .engine
            .transcode(
                &job.input,
                &job.output,
                &DELIVERY_PROFILE,
                job.overlay_text.as_deref(),
            )
            .await?;

        // Best effort: a failed or timed-out extraction downgrades to a null
        // thumbnail, never to a failed request.
        let thumbnail = match state.engine.extract_frame(&job.output, &job.thumbnail).await {
            Ok(()) => match tokio::fs::read(&job.thumbnail).await {
                Ok(bytes) => Some(to_data_uri("image/jpeg", &bytes)),
                Err(e) => {
                    warn!("Thumbnail unreadable after extraction: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Thumbnail extraction skipped: {}", e);
                None
            }
        };

        let processed =
            tokio::fs::read(&job.output)
                .await
                .map_err(|source| ProcessingError::Filesystem {
                    path: job.output.clone(),
                    source,
                })?;

        Ok(ProcessResponse {
            success: true,
            original_name: asset.name,
            original_size: asset.size,
            processed_size: processed.len() as u64,
            processed_video: to_data_uri("video/mp4", &processed),
            thumbnail,
            timestamp: now_rfc3339(),
        })
    }

    /// Standalone thumbnail path: the same extraction contract run directly
    /// against the uploaded input. With no transcode to fall back on, a
    /// failed extraction is the request's outcome.
    pub async fn thumbnail(
        state: AppState,
        multipart: Multipart,
    ) -> Result<ThumbnailResponse, ProcessingError> {
        let intake = accept_upload(multipart, Path::new(&state.config.upload_dir)).await?;

        let mut temps = TempFiles::new();
        let result = Self::run_thumbnail(&state, intake.asset.path.clone(), &mut temps).await;
        temps.release().await;
        result
    }

    async fn run_thumbnail(
        state: &AppState,
        input: PathBuf,
        temps: &mut TempFiles,
    ) -> Result<ThumbnailResponse, ProcessingError> {
        let job = ProcessingJob::new(input, Path::new(&state.config.output_dir), None);
        temps.register(&job.input);
        temps.register(&job.thumbnail);

        state.engine.extract_frame(&job.input, &job.thumbnail).await?;

        let bytes =
            tokio::fs::read(&job.thumbnail)
                .await
                .map_err(|source| ProcessingError::Filesystem {
                    path: job.thumbnail.clone(),
                    source,
                })?;

        Ok(ThumbnailResponse {
            success: true,
            thumbnail: to_data_uri("image/jpeg", &bytes),
            size: bytes.len() as u64,
            timestamp: now_rfc3339(),
        })
    }
}
