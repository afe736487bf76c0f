use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::time::Duration;

/// Ceiling on uploaded request bodies, enforced by the ingress layer.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub upload_dir: String,
    pub output_dir: String,
    pub ffmpeg_path: String,
    pub transcode_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            upload_dir: env::get_or(EnvKey::UploadDir, "./tmp/uploads"),
            output_dir: env::get_or(EnvKey::OutputDir, "./tmp/outputs"),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            transcode_timeout: Duration::from_secs(env::get_parsed(
                EnvKey::TranscodeTimeoutSecs,
                300,
            )),
            allowed_origins: parse_origins(&env::get_or(EnvKey::AllowedOrigins, "")),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
