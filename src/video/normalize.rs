//! Request normalization: turns loosely-typed form input into a validated
//! [`GenerationRequest`].
//!
//! Normalization never touches the network. Provider-specific defaults (model
//! tier, resolution, audio) are left unset here and chosen by the adapter.

use crate::error::{Result, VidGenError};
use crate::registry::{get_provider_by_id, ProviderDescriptor};
use crate::video::types::{image_mime_for, ConditioningImage, GenerationRequest, ProviderOptions};
use serde::Deserialize;
use std::path::Path;

/// Longest clip accepted when the provider is unknown.
const MAX_DURATION_SECS: u32 = 60;
/// Most videos accepted when the provider is unknown.
const MAX_VIDEOS: u32 = 4;

/// An uploaded reference image, before encoding.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl RawImage {
    /// Reads an image file, detecting its MIME type.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime_type = image_mime_for(path, &bytes)?.to_string();
        Ok(Self { bytes, mime_type })
    }
}

impl std::fmt::Debug for RawImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImage")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Raw generation parameters as submitted by an upstream form.
///
/// Numbers arrive as strings; empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGenerationParams {
    pub provider: String,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub duration_seconds: Option<String>,
    pub number_of_videos: Option<String>,
    pub aspect_ratio: Option<String>,
    pub conditioning_image: Option<RawImage>,
    pub model_tier: Option<String>,
    pub resolution: Option<String>,
    pub fps: Option<String>,
    pub audio: Option<String>,
}

impl RawGenerationParams {
    /// Creates parameters with only a provider and prompt set.
    pub fn new(provider: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }
}

/// Validates raw parameters and fills defaults.
///
/// When the provider id is registered, the request is also checked against
/// its capability descriptor: out-of-range scalars are rejected, optional
/// fields the provider cannot use are dropped. Unknown provider ids pass
/// through so the router can report them.
pub fn normalize_request(raw: &RawGenerationParams) -> Result<GenerationRequest> {
    let prompt = non_empty(raw.prompt.as_deref())
        .ok_or_else(|| VidGenError::InvalidRequest("prompt is required".into()))?;

    let provider_id = raw.provider.trim();
    let descriptor = get_provider_by_id(provider_id);

    let max_duration = descriptor.map_or(MAX_DURATION_SECS, |d| d.max_duration);
    let duration_secs = match non_empty(raw.duration_seconds.as_deref()) {
        Some(value) => {
            let secs = parse_in_range("durationSeconds", value, 1, max_duration)?;
            if let Some(d) = descriptor {
                if !d.supports_duration(secs) {
                    return Err(VidGenError::InvalidRequest(format!(
                        "{} does not support {}s clips (supported: {:?})",
                        d.name, secs, d.capabilities.supported_durations
                    )));
                }
            }
            secs
        }
        None => descriptor.map_or(5, |d| d.default_duration()),
    };

    let max_videos = descriptor.map_or(MAX_VIDEOS, |d| d.max_videos());
    let number_of_videos = match non_empty(raw.number_of_videos.as_deref()) {
        Some(value) => parse_in_range("numberOfVideos", value, 1, max_videos)?,
        None => 1,
    };

    let aspect_ratio = match non_empty(raw.aspect_ratio.as_deref()) {
        Some(ratio) => {
            validate_aspect_ratio(ratio)?;
            if let Some(d) = descriptor {
                if !d.supports_aspect_ratio(ratio) {
                    return Err(VidGenError::InvalidRequest(format!(
                        "{} does not support aspect ratio {} (supported: {:?})",
                        d.name, ratio, d.supported_aspect_ratios
                    )));
                }
            }
            ratio.to_string()
        }
        None => descriptor
            .map_or("16:9", |d| d.default_aspect_ratio())
            .to_string(),
    };

    let negative_prompt = non_empty(raw.negative_prompt.as_deref())
        .filter(|_| supported(descriptor, "negative prompt", |d| {
            d.capabilities.supports_negative_prompt
        }))
        .map(str::to_string);

    let conditioning_image = match &raw.conditioning_image {
        Some(image) => {
            let encoded = encode_image(image)?;
            supported(descriptor, "conditioning image", |d| {
                d.capabilities.supports_conditioning_image
            })
            .then_some(encoded)
        }
        None => None,
    };

    let options = normalize_options(raw, descriptor)?;

    Ok(GenerationRequest {
        provider: provider_id.to_string(),
        prompt: prompt.to_string(),
        negative_prompt,
        duration_secs,
        aspect_ratio,
        number_of_videos,
        conditioning_image,
        options,
    })
}

fn normalize_options(
    raw: &RawGenerationParams,
    descriptor: Option<&'static ProviderDescriptor>,
) -> Result<ProviderOptions> {
    let mut options = ProviderOptions::default();

    if let Some(tier) = non_empty(raw.model_tier.as_deref()) {
        if supported(descriptor, "model tier", |d| !d.capabilities.model_tiers.is_empty()) {
            check_listed(descriptor, "model tier", tier, |d| {
                d.capabilities.model_tiers.contains(&tier)
            })?;
            options.model_tier = Some(tier.to_string());
        }
    }

    if let Some(resolution) = non_empty(raw.resolution.as_deref()) {
        if supported(descriptor, "resolution", |d| d.capabilities.supports_resolution) {
            check_listed(descriptor, "resolution", resolution, |d| {
                d.capabilities.supported_resolutions.contains(&resolution)
            })?;
            options.resolution = Some(resolution.to_string());
        }
    }

    if let Some(value) = non_empty(raw.fps.as_deref()) {
        let fps = parse_in_range("fps", value, 1, 240)?;
        if supported(descriptor, "fps", |d| d.capabilities.supports_fps) {
            check_listed(descriptor, "fps", value, |d| {
                d.capabilities.supported_fps.contains(&fps)
            })?;
            options.fps = Some(fps);
        }
    }

    if let Some(value) = non_empty(raw.audio.as_deref()) {
        let audio = parse_bool("audio", value)?;
        if supported(descriptor, "audio", |d| d.capabilities.supports_audio) {
            options.audio = Some(audio);
        }
    }

    Ok(options)
}

/// Returns whether the provider accepts a capability, logging when a field
/// is about to be dropped. Unknown providers accept everything.
fn supported(
    descriptor: Option<&'static ProviderDescriptor>,
    field: &str,
    check: impl Fn(&ProviderDescriptor) -> bool,
) -> bool {
    match descriptor {
        Some(d) if !check(d) => {
            tracing::warn!(provider = d.id, field, "dropping field the provider does not support");
            false
        }
        _ => true,
    }
}

fn check_listed(
    descriptor: Option<&'static ProviderDescriptor>,
    field: &str,
    value: &str,
    listed: impl Fn(&ProviderDescriptor) -> bool,
) -> Result<()> {
    match descriptor {
        Some(d) if !listed(d) => Err(VidGenError::InvalidRequest(format!(
            "{} does not support {} {}",
            d.name, field, value
        ))),
        _ => Ok(()),
    }
}

fn encode_image(image: &RawImage) -> Result<ConditioningImage> {
    let mime = image.mime_type.trim();
    if !mime.starts_with("image/") {
        return Err(VidGenError::InvalidRequest(format!(
            "conditioning image must be an image, got {:?}",
            image.mime_type
        )));
    }
    if image.bytes.is_empty() {
        return Err(VidGenError::InvalidRequest(
            "conditioning image is empty".into(),
        ));
    }
    Ok(ConditioningImage::from_bytes(&image.bytes, mime))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_in_range(field: &str, value: &str, min: u32, max: u32) -> Result<u32> {
    let parsed: u32 = value.parse().map_err(|_| {
        VidGenError::InvalidRequest(format!("{field} must be a whole number, got {value:?}"))
    })?;
    if !(min..=max).contains(&parsed) {
        return Err(VidGenError::InvalidRequest(format!(
            "{field} must be between {min} and {max}, got {parsed}"
        )));
    }
    Ok(parsed)
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(VidGenError::InvalidRequest(format!(
            "{field} must be true or false, got {value:?}"
        ))),
    }
}

fn validate_aspect_ratio(ratio: &str) -> Result<()> {
    let valid = ratio
        .split_once(':')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
        .is_some_and(|(w, h)| w > 0 && h > 0);
    if valid {
        Ok(())
    } else {
        Err(VidGenError::InvalidRequest(format!(
            "aspect ratio must look like 16:9, got {ratio:?}"
        )))
    }
}

/// Checks an already-built request against the provider's capabilities.
///
/// Requests built directly with [`GenerationRequest::new`] skip
/// [`normalize_request`]; this catches clip lengths, aspect ratios and
/// counts the provider cannot serve before anything is sent or priced.
pub(crate) fn check_capabilities(
    descriptor: &ProviderDescriptor,
    request: &GenerationRequest,
) -> Result<()> {
    if request.prompt.trim().is_empty() {
        return Err(VidGenError::InvalidRequest("prompt is required".into()));
    }
    if !descriptor.supports_duration(request.duration_secs) {
        return Err(VidGenError::InvalidRequest(format!(
            "{} does not support {}s clips (max {}s, supported: {:?})",
            descriptor.name,
            request.duration_secs,
            descriptor.max_duration,
            descriptor.capabilities.supported_durations
        )));
    }
    if !descriptor.supports_aspect_ratio(&request.aspect_ratio) {
        return Err(VidGenError::InvalidRequest(format!(
            "{} does not support aspect ratio {} (supported: {:?})",
            descriptor.name, request.aspect_ratio, descriptor.supported_aspect_ratios
        )));
    }
    let max_videos = descriptor.max_videos();
    if !(1..=max_videos).contains(&request.number_of_videos) {
        return Err(VidGenError::InvalidRequest(format!(
            "numberOfVideos must be between 1 and {max_videos}, got {}",
            request.number_of_videos
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn raw(provider: &str) -> RawGenerationParams {
        RawGenerationParams::new(provider, "A cat surfing a wave")
    }

    fn assert_invalid(params: &RawGenerationParams) {
        let err = normalize_request(params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest, "{err}");
    }

    #[test]
    fn test_empty_prompt_rejected() {
        for prompt in [None, Some(""), Some("   \t\n")] {
            let params = RawGenerationParams {
                prompt: prompt.map(str::to_string),
                ..raw("luma")
            };
            assert_invalid(&params);
        }
    }

    #[test]
    fn test_prompt_is_trimmed() {
        let params = RawGenerationParams::new("luma", "  a dog  ");
        let req = normalize_request(&params).unwrap();
        assert_eq!(req.prompt, "a dog");
    }

    #[test]
    fn test_defaults_follow_descriptor() {
        let req = normalize_request(&raw("veo-3")).unwrap();
        assert_eq!(req.duration_secs, 4);
        assert_eq!(req.aspect_ratio, "16:9");
        assert_eq!(req.number_of_videos, 1);
        assert_eq!(req.options, ProviderOptions::default());
    }

    #[test]
    fn test_non_numeric_and_out_of_range_rejected() {
        for (duration, count) in [("five", "1"), ("5", "two"), ("5", "0"), ("5", "9"), ("-1", "1")] {
            let params = RawGenerationParams {
                duration_seconds: Some(duration.into()),
                number_of_videos: Some(count.into()),
                ..raw("stability")
            };
            assert_invalid(&params);
        }
    }

    #[test]
    fn test_unsupported_duration_rejected_not_clamped() {
        let params = RawGenerationParams {
            duration_seconds: Some("5".into()),
            ..raw("veo-3")
        };
        assert_invalid(&params);

        let params = RawGenerationParams {
            duration_seconds: Some("6".into()),
            ..raw("veo-3")
        };
        assert_eq!(normalize_request(&params).unwrap().duration_secs, 6);
    }

    #[test]
    fn test_count_limited_by_capability() {
        let params = RawGenerationParams {
            number_of_videos: Some("2".into()),
            ..raw("luma")
        };
        assert_invalid(&params);

        let params = RawGenerationParams {
            number_of_videos: Some("4".into()),
            ..raw("openai-sora")
        };
        assert_eq!(normalize_request(&params).unwrap().number_of_videos, 4);
    }

    #[test]
    fn test_aspect_ratio_checked() {
        let params = RawGenerationParams {
            aspect_ratio: Some("9:16".into()),
            ..raw("veo-3")
        };
        assert_invalid(&params);

        let params = RawGenerationParams {
            aspect_ratio: Some("wide".into()),
            ..raw("unknown-provider")
        };
        assert_invalid(&params);
    }

    #[test]
    fn test_conditioning_image_encoded() {
        let params = RawGenerationParams {
            conditioning_image: Some(RawImage {
                bytes: b"abc".to_vec(),
                mime_type: "image/png".into(),
            }),
            ..raw("luma")
        };
        let req = normalize_request(&params).unwrap();
        let image = req.conditioning_image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.image_bytes, "YWJj");
    }

    #[test]
    fn test_conditioning_image_must_be_image() {
        let params = RawGenerationParams {
            conditioning_image: Some(RawImage {
                bytes: b"abc".to_vec(),
                mime_type: "video/mp4".into(),
            }),
            ..raw("luma")
        };
        assert_invalid(&params);
    }

    #[test]
    fn test_unsupported_options_dropped() {
        let params = RawGenerationParams {
            model_tier: Some("veo3-quality".into()),
            fps: Some("30".into()),
            audio: Some("false".into()),
            resolution: Some("720p".into()),
            ..raw("veo-2")
        };
        let req = normalize_request(&params).unwrap();
        assert_eq!(req.options, ProviderOptions::default());
    }

    #[test]
    fn test_supported_options_kept_and_checked() {
        let params = RawGenerationParams {
            model_tier: Some("veo3-quality".into()),
            resolution: Some("1080p".into()),
            audio: Some("false".into()),
            ..raw("veo-3")
        };
        let req = normalize_request(&params).unwrap();
        assert_eq!(req.options.model_tier.as_deref(), Some("veo3-quality"));
        assert_eq!(req.options.resolution.as_deref(), Some("1080p"));
        assert_eq!(req.options.audio, Some(false));

        let params = RawGenerationParams {
            resolution: Some("4K".into()),
            ..raw("veo-3")
        };
        assert_invalid(&params);

        let params = RawGenerationParams {
            model_tier: Some("veo3-ultra".into()),
            ..raw("veo-3")
        };
        assert_invalid(&params);
    }

    #[test]
    fn test_fps_checked_against_list() {
        let params = RawGenerationParams {
            fps: Some("60".into()),
            ..raw("runwayml")
        };
        assert_eq!(normalize_request(&params).unwrap().options.fps, Some(60));

        let params = RawGenerationParams {
            fps: Some("25".into()),
            ..raw("runwayml")
        };
        assert_invalid(&params);
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let params = RawGenerationParams {
            negative_prompt: Some(String::new()),
            duration_seconds: Some(" ".into()),
            ..raw("luma")
        };
        let req = normalize_request(&params).unwrap();
        assert!(req.negative_prompt.is_none());
        assert_eq!(req.duration_secs, 3);
    }

    #[test]
    fn test_unknown_provider_passes_through() {
        let params = RawGenerationParams {
            duration_seconds: Some("7".into()),
            negative_prompt: Some("rain".into()),
            ..raw("made-up")
        };
        let req = normalize_request(&params).unwrap();
        assert_eq!(req.provider, "made-up");
        assert_eq!(req.duration_secs, 7);
        assert_eq!(req.negative_prompt.as_deref(), Some("rain"));
    }

    #[tokio::test]
    async fn test_raw_image_from_path_uses_extension_fallback() {
        let path = std::env::temp_dir().join(format!("vidgen-raw-{}.jpeg", std::process::id()));
        tokio::fs::write(&path, b"not really a jpeg").await.unwrap();

        let image = RawImage::from_path(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, b"not really a jpeg");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[test]
    fn test_check_capabilities_rejects_out_of_range_scalars() {
        let luma = get_provider_by_id("luma").unwrap();
        let ok = GenerationRequest::new("luma", "Waves");
        assert!(check_capabilities(luma, &ok).is_ok());

        for bad in [
            ok.clone().with_duration(60),
            ok.clone().with_aspect_ratio("21:9"),
            ok.clone().with_number_of_videos(4),
            ok.clone().with_number_of_videos(0),
            GenerationRequest::new("luma", "   "),
        ] {
            let err = check_capabilities(luma, &bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRequest, "{bad:?}");
        }
    }

    #[test]
    fn test_normalized_requests_pass_capability_check() {
        for id in ["veo-2", "veo-3", "runwayml", "luma", "stability", "openai-sora"] {
            let req = normalize_request(&raw(id)).unwrap();
            let descriptor = get_provider_by_id(id).unwrap();
            assert!(check_capabilities(descriptor, &req).is_ok(), "{id}");
        }
    }
}
