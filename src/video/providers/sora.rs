//! OpenAI Sora video generation adapter.

use crate::error::Result;
use crate::registry::ProviderDescriptor;
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::providers::http::{generate_sync, join_url, OptionalFields};
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use serde::Serialize;

const BASE_URL: &str = "https://api.openai.com";
const GENERATE_PATH: &str = "/v1/video/generations";

/// Sora model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SoraModel {
    /// Sora 1.0.
    #[default]
    Sora1,
}

impl SoraModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sora1 => "sora-1.0",
        }
    }
}

/// Builder for SoraAdapter.
#[derive(Debug, Clone)]
pub struct SoraAdapterBuilder {
    base_url: String,
    model: SoraModel,
    client: Option<reqwest::Client>,
}

impl Default for SoraAdapterBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            model: SoraModel::default(),
            client: None,
        }
    }
}

impl SoraAdapterBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the Sora model variant.
    pub fn model(mut self, model: SoraModel) -> Self {
        self.model = model;
        self
    }

    /// Shares an existing HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the adapter.
    pub fn build(self) -> SoraAdapter {
        SoraAdapter {
            client: self.client.unwrap_or_default(),
            url: join_url(&self.base_url, GENERATE_PATH),
            model: self.model,
        }
    }
}

/// OpenAI Sora adapter.
pub struct SoraAdapter {
    client: reqwest::Client,
    url: String,
    model: SoraModel,
}

impl SoraAdapter {
    /// Creates a new `SoraAdapterBuilder`.
    pub fn builder() -> SoraAdapterBuilder {
        SoraAdapterBuilder::new()
    }
}

#[async_trait]
impl VideoAdapter for SoraAdapter {
    fn provider_id(&self) -> &'static str {
        "openai-sora"
    }

    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let api_key = ctx.require_api_key()?;
        let body = SoraRequest::from_request(request, ctx.descriptor, self.model);
        generate_sync(&ctx, &self.client, &self.url, api_key, &body, request).await
    }
}

#[derive(Debug, Serialize)]
struct SoraRequest {
    model: &'static str,
    prompt: String,
    duration: u32,
    aspect_ratio: String,
    quality: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
}

impl SoraRequest {
    fn from_request(req: &GenerationRequest, descriptor: &ProviderDescriptor, model: SoraModel) -> Self {
        let optional = OptionalFields::from_request(descriptor, req);
        // 720p is the only standard-definition option; everything else is HD.
        let quality = match optional.resolution.as_deref() {
            Some("720p") => "standard",
            _ => "hd",
        };
        Self {
            model: model.as_str(),
            prompt: req.prompt.clone(),
            duration: req.duration_secs,
            aspect_ratio: req.aspect_ratio.clone(),
            quality,
            negative_prompt: optional.negative_prompt,
            image: optional.image_data_uri,
            resolution: optional.resolution,
            fps: optional.fps,
        }
    }
}
