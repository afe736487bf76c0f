use crate::modules::processing::error::ProcessingError;
use axum::extract::{Multipart, multipart::Field};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

pub const VIDEO_FIELD: &str = "video";
pub const OVERLAY_FIELD: &str = "overlay";

/// A single accepted upload, persisted to the upload directory.
#[derive(Debug)]
pub struct UploadedAsset {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

/// Everything intake pulls out of one multipart request: the stored file
/// plus the optional caller-supplied overlay string.
#[derive(Debug)]
pub struct IntakeResult {
    pub asset: UploadedAsset,
    pub overlay_text: Option<String>,
}

/// Walks the multipart stream, persists the single `video` field under a
/// collision-resistant name in `upload_dir`, and collects the optional
/// `overlay` text field. When no video part is present the request fails
/// with a 400-mapped error and nothing is left on disk.
pub async fn accept_upload(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<IntakeResult, ProcessingError> {
    let mut asset: Option<UploadedAsset> = None;
    let mut overlay_text: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                discard(&mut asset).await;
                return Err(ProcessingError::MissingFile(format!(
                    "unreadable multipart request: {e}"
                )));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        if name == VIDEO_FIELD && asset.is_none() {
            asset = Some(save_field(field, upload_dir).await?);
        } else if name == OVERLAY_FIELD {
            if let Ok(text) = field.text().await {
                if !text.trim().is_empty() {
                    overlay_text = Some(text);
                }
            }
        }
        // Unknown and duplicate fields are skipped, not rejected.
    }

    match asset {
        Some(asset) => Ok(IntakeResult {
            asset,
            overlay_text,
        }),
        None => Err(ProcessingError::MissingFile(
            "expected a multipart file field named \"video\"".to_string(),
        )),
    }
}

/// Streams one field to disk chunk by chunk.
async fn save_field(
    mut field: Field<'_>,
    upload_dir: &Path,
) -> Result<UploadedAsset, ProcessingError> {
    let name = field.file_name().unwrap_or("upload.mp4").to_string();
    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| mime_guess::from_path(&name).first_or_octet_stream().to_string());

    let extension = Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    let suffix = Uuid::new_v4().as_simple().to_string();
    let path = upload_dir.join(format!("input_{suffix}.{extension}"));

    let mut file = File::create(&path)
        .await
        .map_err(|source| ProcessingError::Filesystem {
            path: path.clone(),
            source,
        })?;

    let mut size: u64 = 0;
    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                // A half-written input must not outlive the failed request.
                let _ = tokio::fs::remove_file(&path).await;
                return Err(ProcessingError::MissingFile(format!(
                    "upload stream interrupted: {e}"
                )));
            }
        };

        size += chunk.len() as u64;
        if let Err(source) = file.write_all(&chunk).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ProcessingError::Filesystem {
                path: path.clone(),
                source,
            });
        }
    }

    if let Err(source) = file.flush().await {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(ProcessingError::Filesystem {
            path: path.clone(),
            source,
        });
    }

    info!("Stored upload {} ({} bytes) at {}", name, size, path.display());

    Ok(UploadedAsset {
        path,
        name,
        size,
        content_type,
    })
}

async fn discard(asset: &mut Option<UploadedAsset>) {
    if let Some(asset) = asset.take() {
        if let Err(e) = tokio::fs::remove_file(&asset.path).await {
            warn!("Failed to discard {}: {}", asset.path.display(), e);
        }
    }
}
