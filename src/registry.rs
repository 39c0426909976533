//! Provider registry: static capability descriptors for every supported
//! video generation provider.
//!
//! The table is plain `'static` data, written once at compile time and shared
//! by reference, so lookups need no locking. Order is registration order and
//! is stable across calls.

use serde::Serialize;

/// How a provider expects its credential to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// Raw API key, usually in a provider-specific header.
    ApiKey,
    /// OAuth access token.
    OAuth,
    /// `Authorization: Bearer <token>`.
    Bearer,
}

/// Monthly free allowance offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeTier {
    pub seconds: u32,
    pub description: &'static str,
}

/// Per-second pricing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pricing {
    pub cost_per_second: f64,
    pub currency: &'static str,
    pub free_tier: Option<FreeTier>,
}

/// What parameters a provider accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capabilities {
    pub supports_multiple_videos: bool,
    pub max_videos: u32,
    pub supports_conditioning_image: bool,
    pub supports_negative_prompt: bool,
    pub supports_resolution: bool,
    pub supported_resolutions: &'static [&'static str],
    pub supports_fps: bool,
    pub supported_fps: &'static [u32],
    /// Empty means any whole number of seconds up to `max_duration`.
    pub supported_durations: &'static [u32],
    pub supports_audio: bool,
    /// Selectable model tiers; the first entry is the default.
    pub model_tiers: &'static [&'static str],
}

/// Static description of one video generation provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderDescriptor {
    /// Registry key (e.g. `"runwayml"`).
    pub id: &'static str,
    /// Human-readable name for logs and listings.
    pub name: &'static str,
    pub description: &'static str,
    pub pricing: Pricing,
    pub features: &'static [&'static str],
    /// Longest clip, in seconds.
    pub max_duration: u32,
    pub supported_aspect_ratios: &'static [&'static str],
    /// Generation endpoint used by the adapter.
    pub api_endpoint: &'static str,
    pub auth_type: AuthType,
    /// Environment variable callers read the credential from.
    pub credential_env: &'static str,
    pub capabilities: Capabilities,
}

impl ProviderDescriptor {
    /// Returns true if `seconds` is an acceptable clip length.
    pub fn supports_duration(&self, seconds: u32) -> bool {
        if self.capabilities.supported_durations.is_empty() {
            (1..=self.max_duration).contains(&seconds)
        } else {
            self.capabilities.supported_durations.contains(&seconds)
        }
    }

    /// Returns true if the aspect ratio is listed for this provider.
    pub fn supports_aspect_ratio(&self, ratio: &str) -> bool {
        self.supported_aspect_ratios.contains(&ratio)
    }

    /// Largest number of videos a single request may ask for.
    pub fn max_videos(&self) -> u32 {
        if self.capabilities.supports_multiple_videos {
            self.capabilities.max_videos.max(1)
        } else {
            1
        }
    }

    /// Duration used when the caller does not pick one.
    pub fn default_duration(&self) -> u32 {
        self.capabilities
            .supported_durations
            .first()
            .copied()
            .unwrap_or_else(|| 5.min(self.max_duration))
    }

    /// Aspect ratio used when the caller does not pick one.
    pub fn default_aspect_ratio(&self) -> &'static str {
        self.supported_aspect_ratios.first().copied().unwrap_or("16:9")
    }

    /// Checks that the descriptor's fields agree with each other.
    ///
    /// Returns one message per inconsistency; an empty list means the
    /// descriptor is sound.
    pub fn validate(&self) -> Vec<String> {
        let caps = &self.capabilities;
        let mut problems = Vec::new();

        if self.max_duration == 0 {
            problems.push("max_duration must be positive".to_string());
        }
        if let Some(d) = caps
            .supported_durations
            .iter()
            .find(|&&d| d == 0 || d > self.max_duration)
        {
            problems.push(format!(
                "supported duration {d}s outside 1..={}s",
                self.max_duration
            ));
        }
        if caps.max_videos == 0 {
            problems.push("max_videos must be at least 1".to_string());
        }
        if !caps.supports_multiple_videos && caps.max_videos > 1 {
            problems.push("max_videos > 1 without multiple-video support".to_string());
        }
        if !caps.supports_resolution && !caps.supported_resolutions.is_empty() {
            problems.push("resolutions listed without resolution support".to_string());
        }
        if caps.supports_resolution && caps.supported_resolutions.is_empty() {
            problems.push("resolution support without any resolution".to_string());
        }
        if !caps.supports_fps && !caps.supported_fps.is_empty() {
            problems.push("FPS values listed without FPS support".to_string());
        }
        if caps.supports_fps && caps.supported_fps.is_empty() {
            problems.push("FPS support without any FPS value".to_string());
        }
        if self.supported_aspect_ratios.is_empty() {
            problems.push("no supported aspect ratio".to_string());
        }
        if self.pricing.cost_per_second < 0.0 || !self.pricing.cost_per_second.is_finite() {
            problems.push("cost per second must be a non-negative number".to_string());
        }
        problems
    }
}

/// Every registered provider, in registration order.
pub static PROVIDERS: &[ProviderDescriptor] = &[
    // Veo 2 via the Gemini long-running operation API
    ProviderDescriptor {
        id: "veo-2",
        name: "Google Veo 2.0",
        description: "Google's latest video generation model with high quality output",
        pricing: Pricing {
            cost_per_second: 0.35,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 30,
                description: "30 seconds free per month",
            }),
        },
        features: &["Text-to-video", "Image-to-video", "High quality", "Fast generation"],
        max_duration: 8,
        supported_aspect_ratios: &["16:9", "9:16"],
        api_endpoint: "https://generativelanguage.googleapis.com/v1beta/models/veo-2.0-generate-001:predictLongRunning",
        auth_type: AuthType::ApiKey,
        credential_env: "GOOGLE_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: false,
            max_videos: 1,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: false,
            supported_resolutions: &[],
            supports_fps: false,
            supported_fps: &[],
            supported_durations: &[5, 6, 7, 8],
            supports_audio: false,
            model_tiers: &[],
        },
    },
    // Veo 3 via the veo3gen task API
    ProviderDescriptor {
        id: "veo-3",
        name: "VEO3 API",
        description: "Advanced video generation with enhanced capabilities and audio generation",
        pricing: Pricing {
            cost_per_second: 0.08,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 20,
                description: "20 seconds free per month",
            }),
        },
        features: &[
            "Text-to-video",
            "Image-to-video",
            "Audio generation",
            "Enhanced prompts",
            "Advanced features",
        ],
        max_duration: 8,
        supported_aspect_ratios: &["16:9"],
        api_endpoint: "https://api.veo3gen.app/api/generate",
        auth_type: AuthType::ApiKey,
        credential_env: "VEO3_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: false,
            max_videos: 1,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: true,
            supported_resolutions: &["720p", "1080p"],
            supports_fps: false,
            supported_fps: &[],
            supported_durations: &[4, 6, 8],
            supports_audio: true,
            model_tiers: &["veo3-fast", "veo3-quality"],
        },
    },
    ProviderDescriptor {
        id: "runwayml",
        name: "RunwayML Gen-4",
        description: "Professional video generation with Gen-4 model featuring enhanced camera controls and style consistency",
        pricing: Pricing {
            cost_per_second: 0.05,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 125,
                description: "125 seconds free per month",
            }),
        },
        features: &[
            "Text-to-video",
            "Image-to-video",
            "Video-to-video",
            "Camera controls",
            "Keyframe controls",
            "Style consistency",
        ],
        max_duration: 18,
        supported_aspect_ratios: &["16:9", "9:16", "1:1"],
        api_endpoint: "https://api.runwayml.com/v1/image_to_video",
        auth_type: AuthType::Bearer,
        credential_env: "RUNWAYML_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: true,
            max_videos: 4,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: true,
            supported_resolutions: &["720p", "1080p", "4K"],
            supports_fps: true,
            supported_fps: &[24, 30, 60],
            supported_durations: &[3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18],
            supports_audio: false,
            model_tiers: &[],
        },
    },
    ProviderDescriptor {
        id: "luma",
        name: "Luma Dream Machine",
        description: "State-of-the-art video generation producing 120 frames in 2 minutes with character consistency and realistic physics",
        pricing: Pricing {
            cost_per_second: 0.02,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 30,
                description: "30 seconds free per month",
            }),
        },
        features: &[
            "Text-to-video",
            "Image-to-video",
            "Character consistency",
            "Realistic physics",
            "Camera motion control",
            "Loop creation",
        ],
        max_duration: 5,
        supported_aspect_ratios: &["16:9", "9:16", "1:1"],
        api_endpoint: "https://api.lumalabs.ai/dream-machine/v1/generations",
        auth_type: AuthType::Bearer,
        credential_env: "LUMA_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: false,
            max_videos: 1,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: true,
            supported_resolutions: &["720p", "1080p"],
            supports_fps: false,
            supported_fps: &[],
            supported_durations: &[3, 4, 5],
            supports_audio: false,
            model_tiers: &[],
        },
    },
    // Listed for comparison; no adapter until API access is granted.
    ProviderDescriptor {
        id: "pika",
        name: "Pika Labs 2.2",
        description: "Enhanced video generation with improved image integration and faster generation speeds",
        pricing: Pricing {
            cost_per_second: 0.03,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 20,
                description: "20 seconds free per month",
            }),
        },
        features: &[
            "Text-to-video",
            "Image-to-video",
            "Custom image integration",
            "Faster generation",
            "Artistic styles",
            "Creative effects",
        ],
        max_duration: 4,
        supported_aspect_ratios: &["16:9", "9:16", "1:1"],
        api_endpoint: "https://api.pika.art/v1/generate",
        auth_type: AuthType::Bearer,
        credential_env: "PIKA_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: true,
            max_videos: 3,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: true,
            supported_resolutions: &["720p", "1080p"],
            supports_fps: true,
            supported_fps: &[24, 30],
            supported_durations: &[3, 4],
            supports_audio: false,
            model_tiers: &[],
        },
    },
    ProviderDescriptor {
        id: "stability",
        name: "Stability AI",
        description: "Open-source video generation with competitive pricing",
        pricing: Pricing {
            cost_per_second: 0.01,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 50,
                description: "50 seconds free per month",
            }),
        },
        features: &["Text-to-video", "Open source", "Highly customizable", "Cost-effective"],
        max_duration: 5,
        supported_aspect_ratios: &["16:9", "9:16", "1:1", "4:3"],
        api_endpoint: "https://api.stability.ai/v2beta/image-to-video",
        auth_type: AuthType::Bearer,
        credential_env: "STABILITY_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: true,
            max_videos: 4,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: true,
            supported_resolutions: &["720p", "1080p"],
            supports_fps: true,
            supported_fps: &[24, 30],
            supported_durations: &[3, 4, 5],
            supports_audio: false,
            model_tiers: &[],
        },
    },
    ProviderDescriptor {
        id: "openai-sora",
        name: "OpenAI Sora",
        description: "Advanced video generation with exceptional quality and realistic physics",
        pricing: Pricing {
            cost_per_second: 0.10,
            currency: "USD",
            free_tier: Some(FreeTier {
                seconds: 10,
                description: "10 seconds free per month",
            }),
        },
        features: &[
            "Text-to-video",
            "Image-to-video",
            "Exceptional quality",
            "Realistic physics",
            "Complex scenes",
            "Long-form content",
        ],
        max_duration: 60,
        supported_aspect_ratios: &["16:9", "9:16", "1:1", "4:3", "21:9"],
        api_endpoint: "https://api.openai.com/v1/video/generations",
        auth_type: AuthType::Bearer,
        credential_env: "OPENAI_API_KEY",
        capabilities: Capabilities {
            supports_multiple_videos: true,
            max_videos: 4,
            supports_conditioning_image: true,
            supports_negative_prompt: true,
            supports_resolution: true,
            supported_resolutions: &["720p", "1080p", "4K"],
            supports_fps: true,
            supported_fps: &[24, 30, 60],
            supported_durations: &[5, 10, 15, 20, 30, 45, 60],
            supports_audio: false,
            model_tiers: &[],
        },
    },
];

/// Looks up a provider by its registry id.
pub fn get_provider_by_id(id: &str) -> Option<&'static ProviderDescriptor> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Returns every provider in registration order.
pub fn get_all_providers() -> &'static [ProviderDescriptor] {
    PROVIDERS
}

/// Returns the providers costing at most `max_cost_per_second`, preserving
/// registration order.
pub fn get_providers_by_budget(max_cost_per_second: f64) -> Vec<&'static ProviderDescriptor> {
    PROVIDERS
        .iter()
        .filter(|p| p.pricing.cost_per_second <= max_cost_per_second)
        .collect()
}

/// Returns the registered provider ids in registration order.
pub fn provider_ids() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|p| p.id)
}

/// Finds the providers whose credential lives in the given environment
/// variable.
pub fn find_by_credential_env(env_var: &str) -> Vec<&'static ProviderDescriptor> {
    PROVIDERS
        .iter()
        .filter(|p| p.credential_env == env_var)
        .collect()
}
