//! Luma Dream Machine video generation adapter.

use crate::error::Result;
use crate::registry::ProviderDescriptor;
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::providers::http::{generate_sync, join_url, OptionalFields};
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use serde::Serialize;

const BASE_URL: &str = "https://api.lumalabs.ai";
const GENERATE_PATH: &str = "/dream-machine/v1/generations";

/// Luma model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LumaModel {
    /// Dream Machine v1.
    #[default]
    DreamMachineV1,
}

impl LumaModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DreamMachineV1 => "dream_machine_v1",
        }
    }
}

/// Builder for LumaAdapter.
#[derive(Debug, Clone)]
pub struct LumaAdapterBuilder {
    base_url: String,
    model: LumaModel,
    client: Option<reqwest::Client>,
}

impl Default for LumaAdapterBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            model: LumaModel::default(),
            client: None,
        }
    }
}

impl LumaAdapterBuilder {
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
    pub fn model(mut self, model: LumaModel) -> Self {
        self.model = model;
        self
    }

    /// Shares an existing HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the adapter.
    pub fn build(self) -> LumaAdapter {
        LumaAdapter {
            client: self.client.unwrap_or_default(),
            url: join_url(&self.base_url, GENERATE_PATH),
            model: self.model,
        }
    }
}

/// Luma Dream Machine adapter.
pub struct LumaAdapter {
    client: reqwest::Client,
    url: String,
    model: LumaModel,
}

impl LumaAdapter {
    /// Creates a new `LumaAdapterBuilder`.
    pub fn builder() -> LumaAdapterBuilder {
        LumaAdapterBuilder::new()
    }
}

#[async_trait]
impl VideoAdapter for LumaAdapter {
    fn provider_id(&self) -> &'static str {
        "luma"
    }

    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let api_key = ctx.require_api_key()?;
        let body = LumaRequest::from_request(request, ctx.descriptor, self.model);
        generate_sync(&ctx, &self.client, &self.url, api_key, &body, request).await
    }
}

#[derive(Debug, Serialize)]
struct LumaRequest {
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
}

impl LumaRequest {
    fn from_request(req: &GenerationRequest, descriptor: &ProviderDescriptor, model: LumaModel) -> Self {
        let optional = OptionalFields::from_request(descriptor, req);
        Self {
            prompt: req.prompt.clone(),
            duration: req.duration_secs,
            aspect_ratio: req.aspect_ratio.clone(),
            model: model.as_str(),
            negative_prompt: optional.negative_prompt,
            image: optional.image_data_uri,
            resolution: optional.resolution,
        }
    }
}
