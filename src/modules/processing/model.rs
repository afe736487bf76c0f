use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// Fixed delivery target. Constant configuration, never per-request state.
#[derive(Debug, Clone, Copy)]
pub struct TranscodeProfile {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

/// Standard delivery profile: 720p30 H.264/AAC in MP4.
pub const DELIVERY_PROFILE: TranscodeProfile = TranscodeProfile {
    width: 1280,
    height: 720,
    frame_rate: 30,
    video_codec: "libx264",
    audio_codec: "aac",
    video_bitrate_kbps: 2000,
    audio_bitrate_kbps: 128,
};

/// Per-request working paths. Output and thumbnail always land in the output
/// directory, never next to the input, and every name carries a fresh UUID
/// suffix so concurrent requests cannot clobber or clean up each other.
#[derive(Debug)]
pub struct ProcessingJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub thumbnail: PathBuf,
    pub overlay_text: Option<String>,
}

impl ProcessingJob {
    pub fn new(input: PathBuf, output_dir: &Path, overlay_text: Option<String>) -> Self {
        let suffix = Uuid::new_v4().as_simple().to_string();
        Self {
            input,
            output: output_dir.join(format!("processed_{suffix}.mp4")),
            thumbnail: output_dir.join(format!("thumb_{suffix}.jpg")),
            overlay_text,
        }
    }
}

/// Scoped registry of temp paths for one request. Paths are registered at
/// creation time and removed together by `release`; each removal is guarded
/// independently so one failure cannot stop the rest. Release is idempotent
/// and safe on paths that were never created.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    /// Removes every registered path that still exists. Failures are logged,
    /// never propagated: a leftover temp file must not fail a response that
    /// was already produced.
    pub async fn release(&mut self) {
        for path in self.paths.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
            }
        }
    }
}

/// Unwind fallback; ordinary exits release explicitly.
impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            let _ = std::fs::remove_file(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_paths_live_in_the_output_directory() {
        let job = ProcessingJob::new(PathBuf::from("/in/a.mov"), Path::new("/out"), None);
        assert!(job.output.starts_with("/out"));
        assert!(job.thumbnail.starts_with("/out"));
        assert_eq!(job.output.extension().unwrap(), "mp4");
        assert_eq!(job.thumbnail.extension().unwrap(), "jpg");
    }

    #[test]
    fn concurrent_jobs_never_share_paths() {
        let a = ProcessingJob::new(PathBuf::from("/in/a.mp4"), Path::new("/out"), None);
        let b = ProcessingJob::new(PathBuf::from("/in/a.mp4"), Path::new("/out"), None);
        assert_ne!(a.output, b.output);
        assert_ne!(a.thumbnail, b.thumbnail);
    }

    #[test]
    fn delivery_profile_is_720p30() {
        assert_eq!(DELIVERY_PROFILE.width, 1280);
        assert_eq!(DELIVERY_PROFILE.height, 720);
        assert_eq!(DELIVERY_PROFILE.frame_rate, 30);
        assert_eq!(DELIVERY_PROFILE.video_bitrate_kbps, 2000);
        assert_eq!(DELIVERY_PROFILE.audio_bitrate_kbps, 128);
    }

    #[tokio::test]
    async fn release_removes_registered_files() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a.mp4");
        let never_created = dir.path().join("b.jpg");
        std::fs::write(&existing, b"data").unwrap();

        let mut temps = TempFiles::new();
        temps.register(&existing);
        temps.register(&never_created);
        temps.release().await;

        assert!(!existing.exists());
        assert!(!never_created.exists());
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp4");
        std::fs::write(&path, b"data").unwrap();

        let mut temps = TempFiles::new();
        temps.register(&path);
        temps.release().await;
        temps.release().await;

        assert!(!path.exists());
    }

    #[test]
    fn drop_cleans_up_without_an_explicit_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp4");
        std::fs::write(&path, b"data").unwrap();

        {
            let mut temps = TempFiles::new();
            temps.register(&path);
        }

        assert!(!path.exists());
    }
}
