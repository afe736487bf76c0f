use base64::Engine as _;
use serde::Serialize;
use utoipa::ToSchema;

/// Body of a successful `/process` call. Media comes back inline as
/// MIME-tagged base64 data URIs.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    pub original_name: String,
    pub original_size: u64,
    pub processed_size: u64,
    pub processed_video: String,
    /// `null` when extraction failed or timed out; the transcode still counts.
    pub thumbnail: Option<String>,
    pub timestamp: String,
}

/// Body of a successful standalone `/thumbnail` call.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailResponse {
    pub success: bool,
    pub thumbnail: String,
    pub size: u64,
    pub timestamp: String,
}

/// Wraps raw bytes in a self-describing `data:` URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
