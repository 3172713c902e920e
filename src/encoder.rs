//! Turns uploaded image bytes into the base64 form the provider accepts.

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;

use crate::error::AnalyzerError;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// An uploaded image as received from the caller.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub filename: Option<String>,
}

impl ImageAsset {
    /// Wraps an in-memory payload. A missing or non-image media type is
    /// replaced by one sniffed from the payload's magic bytes.
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        media_type: Option<&str>,
        filename: Option<String>,
    ) -> Self {
        let bytes = bytes.into();
        let media_type = resolve_media_type(&bytes, media_type);
        Self {
            bytes,
            media_type,
            filename,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub base64: String,
    pub media_type: String,
}

impl EncodedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64)
    }
}

pub fn encode(asset: &ImageAsset) -> Result<EncodedImage, AnalyzerError> {
    if asset.is_empty() {
        return Err(AnalyzerError::InvalidInput("Image payload is empty".into()));
    }

    Ok(EncodedImage {
        base64: general_purpose::STANDARD.encode(&asset.bytes),
        media_type: asset.media_type.clone(),
    })
}

fn resolve_media_type(bytes: &[u8], declared: Option<&str>) -> String {
    let declared = declared.map(str::trim).filter(|m| !m.is_empty());
    if let Some(media_type) = declared.filter(|m| m.starts_with("image/")) {
        return media_type.to_string();
    }

    image::guess_format(bytes)
        .ok()
        .and_then(mime_for)
        .or(declared)
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Ico => Some("image/x-icon"),
        ImageFormat::Avif => Some("image/avif"),
        _ => None,
    }
}
