use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::modules::processing::error::ProcessingError;
use crate::modules::processing::model::TranscodeProfile;

/// Offset into the media where the still frame is pulled.
const THUMBNAIL_OFFSET_SECS: u32 = 1;
/// Fixed size of extracted still frames.
const THUMBNAIL_SIZE: &str = "320x240";
/// Hard ceiling on a thumbnail extraction run.
const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(30);

/// Client around the external ffmpeg binary. Each call spawns one process
/// and resolves on its single terminal outcome; stderr is the diagnostic
/// channel.
#[derive(Clone)]
pub struct MediaEngine {
    binary: String,
    transcode_timeout: Duration,
}

impl MediaEngine {
    pub fn new(binary: &str, transcode_timeout: Duration) -> Self {
        Self {
            binary: binary.to_string(),
            transcode_timeout,
        }
    }

    /// Re-encodes `input` into `output` at the delivery profile, burning
    /// `overlay` into the top-right corner when present. The overlay sits in
    /// the same filter graph as the scale, so it lands in pixel data before
    /// encoding.
    pub async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        profile: &TranscodeProfile,
        overlay: Option<&str>,
    ) -> Result<(), ProcessingError> {
        let filter = video_filter(profile, overlay);

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-i")
            .arg(input)
            .args(["-vf", &filter])
            .args(["-c:v", profile.video_codec])
            .args(["-c:a", profile.audio_codec])
            .args(["-b:v", &format!("{}k", profile.video_bitrate_kbps)])
            .args(["-b:a", &format!("{}k", profile.audio_bitrate_kbps)])
            .args(["-r", &profile.frame_rate.to_string()])
            .args(["-movflags", "+faststart"])
            .arg("-y")
            .arg(output);

        self.run(cmd, self.transcode_timeout, "transcode")
            .await
            .map_err(ProcessingError::Transcode)?;

        // The engine's exit status and filesystem visibility are not atomic;
        // trust the file, not the signal.
        let size = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(ProcessingError::Transcode("output not produced".to_string()));
        }

        info!(
            "Transcoded {} -> {} ({} bytes)",
            input.display(),
            output.display(),
            size
        );
        Ok(())
    }

    /// Pulls a single 320x240 frame from `source` at the fixed offset,
    /// bounded by a hard timeout.
    pub async fn extract_frame(&self, source: &Path, output: &Path) -> Result<(), ProcessingError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-ss", &THUMBNAIL_OFFSET_SECS.to_string()])
            .arg("-i")
            .arg(source)
            .args(["-vframes", "1"])
            .args(["-s", THUMBNAIL_SIZE])
            .arg("-y")
            .arg(output);

        self.run(cmd, THUMBNAIL_TIMEOUT, "thumbnail extraction")
            .await
            .map_err(ProcessingError::Thumbnail)?;

        let size = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(ProcessingError::Thumbnail("frame not produced".to_string()));
        }
        Ok(())
    }

    /// Spawns the engine once and waits for its terminal outcome, bounded by
    /// `limit`. On timeout the dropped child is killed.
    async fn run(&self, mut cmd: Command, limit: Duration, label: &str) -> Result<(), String> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Spawning {:?}", cmd.as_std());

        let child = cmd
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {}", self.binary, e))?;

        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| format!("{label} did not complete: {e}"))?,
            Err(_) => return Err(format!("{label} timed out after {}s", limit.as_secs())),
        };

        if !output.status.success() {
            return Err(format!("{label} failed: {}", stderr_tail(&output.stderr)));
        }
        Ok(())
    }
}

/// Filter graph for the transcode: optional drawtext overlay (top-right,
/// semi-opaque box) followed by the scale to the delivery resolution.
fn video_filter(profile: &TranscodeProfile, overlay: Option<&str>) -> String {
    match overlay {
        Some(text) => format!(
            "drawtext=text='{}':x=w-tw-10:y=10:fontsize=24:fontcolor=white:box=1:boxcolor=black@0.5:boxborderw=5,scale={}:{}",
            escape_drawtext(text),
            profile.width,
            profile.height,
        ),
        None => format!("scale={}:{}", profile.width, profile.height),
    }
}

/// Escapes text destined for the drawtext filter. Backslash first, then the
/// characters the filter parser treats specially.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

/// Last few stderr lines; ffmpeg prints the actual failure at the bottom.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "no diagnostic output".to_string();
    }
    let lines: Vec<&str> = trimmed.lines().collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}
