//! RunwayML Gen-4 video generation adapter.

use crate::error::Result;
use crate::registry::ProviderDescriptor;
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::providers::http::{generate_sync, join_url, OptionalFields};
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use serde::Serialize;

const BASE_URL: &str = "https://api.runwayml.com";
const GENERATE_PATH: &str = "/v1/image_to_video";

/// RunwayML model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunwayModel {
    /// Gen-4 with camera, keyframe and style controls.
    #[default]
    Gen4,
}

impl RunwayModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gen4 => "gen4",
        }
    }
}

/// Builder for RunwayAdapter.
#[derive(Debug, Clone)]
pub struct RunwayAdapterBuilder {
    base_url: String,
    model: RunwayModel,
    client: Option<reqwest::Client>,
}

impl Default for RunwayAdapterBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            model: RunwayModel::default(),
            client: None,
        }
    }
}

impl RunwayAdapterBuilder {
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
    pub fn model(mut self, model: RunwayModel) -> Self {
        self.model = model;
        self
    }

    /// Shares an existing HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the adapter.
    pub fn build(self) -> RunwayAdapter {
        RunwayAdapter {
            client: self.client.unwrap_or_default(),
            url: join_url(&self.base_url, GENERATE_PATH),
            model: self.model,
        }
    }
}

/// RunwayML adapter: one POST, video URL in the response.
pub struct RunwayAdapter {
    client: reqwest::Client,
    url: String,
    model: RunwayModel,
}

impl RunwayAdapter {
    /// Creates a new `RunwayAdapterBuilder`.
    pub fn builder() -> RunwayAdapterBuilder {
        RunwayAdapterBuilder::new()
    }
}

#[async_trait]
impl VideoAdapter for RunwayAdapter {
    fn provider_id(&self) -> &'static str {
        "runwayml"
    }

    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let api_key = ctx.require_api_key()?;
        let body = RunwayRequest::from_request(request, ctx.descriptor, self.model);
        generate_sync(&ctx, &self.client, &self.url, api_key, &body, request).await
    }
}

// Request types

#[derive(Debug, Serialize)]
struct RunwayRequest {
    prompt: String,
    duration: u32,
    aspect_ratio: String,
    model: &'static str,
    style_consistency: bool,
    camera_controls: bool,
    keyframe_controls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
}

impl RunwayRequest {
    fn from_request(
        req: &GenerationRequest,
        descriptor: &ProviderDescriptor,
        model: RunwayModel,
    ) -> Self {
        let optional = OptionalFields::from_request(descriptor, req);
        Self {
            prompt: req.prompt.clone(),
            duration: req.duration_secs,
            aspect_ratio: req.aspect_ratio.clone(),
            model: model.as_str(),
            style_consistency: true,
            camera_controls: true,
            keyframe_controls: true,
            negative_prompt: optional.negative_prompt,
            image: optional.image_data_uri,
            resolution: optional.resolution,
            fps: optional.fps,
        }
    }
}
