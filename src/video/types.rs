//! Core types for video generation requests and results.

use crate::error::{ErrorKind, Result, VidGenError};
use crate::registry::get_provider_by_id;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Provider-specific extension fields.
///
/// Only forwarded to providers whose capability descriptor declares the
/// matching capability. When a field is absent the adapter picks its own
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    /// Model tier (e.g., "veo3-fast", "veo3-quality").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_tier: Option<String>,
    /// Output resolution (e.g., "720p").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Frames per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    /// Whether to generate an audio track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,
}

/// A reference image steering image-to-video generation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditioningImage {
    /// MIME type (e.g., "image/png").
    pub mime_type: String,
    /// Standard base64 encoding of the image bytes.
    pub image_bytes: String,
}

impl std::fmt::Debug for ConditioningImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditioningImage")
            .field("mime_type", &self.mime_type)
            .field("base64_len", &self.image_bytes.len())
            .finish()
    }
}

impl ConditioningImage {
    /// Encodes raw image bytes with their declared MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            image_bytes: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Reads an image file fully into memory.
    ///
    /// The MIME type is detected from magic bytes, falling back to the file
    /// extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = image_mime_for(path, &bytes)?;
        Ok(Self::from_bytes(&bytes, mime))
    }

    /// Returns the image as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_bytes)
    }
}

/// MIME type of an image file, from magic bytes or else the extension.
pub(crate) fn image_mime_for(path: &Path, bytes: &[u8]) -> Result<&'static str> {
    detect_image_mime(bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(mime_from_extension)
        })
        .ok_or_else(|| {
            VidGenError::InvalidRequest(format!("unrecognized image format: {}", path.display()))
        })
}

/// Detects an image MIME type from its leading bytes.
pub(crate) fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"GIF8") {
        Some("image/gif")
    } else {
        None
    }
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// A validated request to generate video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Target provider id.
    pub provider: String,
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// What the video should avoid.
    pub negative_prompt: Option<String>,
    /// Clip duration in seconds.
    pub duration_secs: u32,
    /// Aspect ratio (e.g., "16:9").
    pub aspect_ratio: String,
    /// How many videos to request.
    pub number_of_videos: u32,
    /// Optional reference image.
    pub conditioning_image: Option<ConditioningImage>,
    /// Provider-specific extension fields.
    #[serde(default)]
    pub options: ProviderOptions,
}

impl GenerationRequest {
    /// Creates a single-video request.
    ///
    /// Duration and aspect ratio default to the provider's first supported
    /// values, or 5 seconds at 16:9 for an unregistered id.
    pub fn new(provider: impl Into<String>, prompt: impl Into<String>) -> Self {
        let provider = provider.into();
        let descriptor = get_provider_by_id(&provider);
        Self {
            duration_secs: descriptor.map_or(5, |d| d.default_duration()),
            aspect_ratio: descriptor
                .map_or("16:9", |d| d.default_aspect_ratio())
                .to_string(),
            provider,
            prompt: prompt.into(),
            negative_prompt: None,
            number_of_videos: 1,
            conditioning_image: None,
            options: ProviderOptions::default(),
        }
    }

    /// Sets the clip duration in seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = ratio.into();
        self
    }

    /// Sets the number of videos.
    pub fn with_number_of_videos(mut self, count: u32) -> Self {
        self.number_of_videos = count;
        self
    }

    /// Sets the negative prompt.
    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }

    /// Sets the conditioning image.
    pub fn with_conditioning_image(mut self, image: ConditioningImage) -> Self {
        self.conditioning_image = Some(image);
        self
    }

    /// Replaces the provider-specific options.
    pub fn with_options(mut self, options: ProviderOptions) -> Self {
        self.options = options;
        self
    }
}

/// The normalized outcome of a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    /// Video locators (URLs); empty on failure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub videos: Vec<String>,
    /// Human-readable failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Echo of the requested provider id.
    pub provider: String,
    /// Computed or provider-reported cost.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl GenerationResult {
    /// Builds a successful result.
    pub fn success(provider: impl Into<String>, videos: Vec<String>, cost: Option<f64>) -> Self {
        Self {
            success: true,
            videos,
            error: None,
            error_kind: None,
            provider: provider.into(),
            cost,
        }
    }

    /// Builds a failed result from an error.
    pub fn failure(provider: impl Into<String>, error: &VidGenError) -> Self {
        Self {
            success: false,
            videos: Vec::new(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            provider: provider.into(),
            cost: None,
        }
    }
}
