//! Stability AI video generation adapter.

use crate::error::Result;
use crate::registry::ProviderDescriptor;
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::providers::http::{generate_sync, join_url, OptionalFields};
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use serde::Serialize;

const BASE_URL: &str = "https://api.stability.ai";
const GENERATE_PATH: &str = "/v2beta/image-to-video";

/// Stability video model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StabilityModel {
    /// Stable Video Diffusion XT 1.1.
    #[default]
    SvdXt11,
}

impl StabilityModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SvdXt11 => "stable-video-diffusion-xt-1-1",
        }
    }
}

/// Builder for StabilityAdapter.
#[derive(Debug, Clone)]
pub struct StabilityAdapterBuilder {
    base_url: String,
    model: StabilityModel,
    client: Option<reqwest::Client>,
}

impl Default for StabilityAdapterBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            model: StabilityModel::default(),
            client: None,
        }
    }
}

impl StabilityAdapterBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the model variant.
    pub fn model(mut self, model: StabilityModel) -> Self {
        self.model = model;
        self
    }

    /// Shares an existing HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the adapter.
    pub fn build(self) -> StabilityAdapter {
        StabilityAdapter {
            client: self.client.unwrap_or_default(),
            url: join_url(&self.base_url, GENERATE_PATH),
            model: self.model,
        }
    }
}

/// Stability AI adapter.
pub struct StabilityAdapter {
    client: reqwest::Client,
    url: String,
    model: StabilityModel,
}

impl StabilityAdapter {
    /// Creates a new `StabilityAdapterBuilder`.
    pub fn builder() -> StabilityAdapterBuilder {
        StabilityAdapterBuilder::new()
    }
}

#[async_trait]
impl VideoAdapter for StabilityAdapter {
    fn provider_id(&self) -> &'static str {
        "stability"
    }

    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let api_key = ctx.require_api_key()?;
        let body = StabilityRequest::from_request(request, ctx.descriptor, self.model);
        generate_sync(&ctx, &self.client, &self.url, api_key, &body, request).await
    }
}

#[derive(Debug, Serialize)]
struct StabilityRequest {
    prompt: String,
    duration: u32,
    aspect_ratio: String,
    model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
}

impl StabilityRequest {
    fn from_request(
        req: &GenerationRequest,
        descriptor: &ProviderDescriptor,
        model: StabilityModel,
    ) -> Self {
        let optional = OptionalFields::from_request(descriptor, req);
        Self {
            prompt: req.prompt.clone(),
            duration: req.duration_secs,
            aspect_ratio: req.aspect_ratio.clone(),
            model: model.as_str(),
            negative_prompt: optional.negative_prompt,
            image: optional.image_data_uri,
            resolution: optional.resolution,
            fps: optional.fps,
        }
    }
}
