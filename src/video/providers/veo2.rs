//! Veo 2 video generation adapter (Gemini Developer API).
//!
//! Uses the long-running operation protocol: `predictLongRunning` returns an
//! operation name, which is polled until `done`.

use crate::error::{Result, VidGenError};
use crate::registry::ProviderDescriptor;
use crate::video::poll::{poll_until_done, PollConfig, PollState, PollStep};
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::providers::http::{get_json, join_url, post_json, request_cost, Auth};
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Veo 2 model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Veo2Model {
    /// Veo 2.0 GA.
    #[default]
    Veo2Generate001,
}

impl Veo2Model {
    /// Returns the Gemini Developer API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo2Generate001 => "veo-2.0-generate-001",
        }
    }
}

/// Builder for Veo2Adapter.
#[derive(Debug, Clone)]
pub struct Veo2AdapterBuilder {
    base_url: String,
    model: Veo2Model,
    poll: PollConfig,
    client: Option<reqwest::Client>,
}

impl Default for Veo2AdapterBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            model: Veo2Model::default(),
            poll: PollConfig::default(),
            client: None,
        }
    }
}

impl Veo2AdapterBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the Veo model variant.
    pub fn model(mut self, model: Veo2Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the polling interval and ceiling.
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Shares an existing HTTP client.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the adapter.
    pub fn build(self) -> Veo2Adapter {
        Veo2Adapter {
            client: self.client.unwrap_or_default(),
            base_url: self.base_url,
            model: self.model,
            poll: self.poll,
        }
    }
}

/// Veo 2 adapter.
pub struct Veo2Adapter {
    client: reqwest::Client,
    base_url: String,
    model: Veo2Model,
    poll: PollConfig,
}

impl Veo2Adapter {
    /// Creates a new `Veo2AdapterBuilder`.
    pub fn builder() -> Veo2AdapterBuilder {
        Veo2AdapterBuilder::new()
    }

    fn generate_url(&self) -> String {
        join_url(
            &self.base_url,
            &format!("/v1beta/models/{}:predictLongRunning", self.model.as_str()),
        )
    }

    /// Submit a video generation request. Returns the operation name.
    async fn submit(
        &self,
        ctx: &AdapterContext<'_>,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = Veo2Request::from_request(request, ctx.descriptor);
        let operation: Veo2Operation = post_json(
            ctx,
            &self.client,
            &self.generate_url(),
            Auth::Header(API_KEY_HEADER, api_key),
            &body,
        )
        .await?;

        operation
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| VidGenError::NoTaskId(ctx.descriptor.name.to_string()))
    }

    async fn poll_until_ready(
        &self,
        ctx: &AdapterContext<'_>,
        api_key: &str,
        operation_name: &str,
    ) -> Result<Vec<String>> {
        let url = join_url(&self.base_url, &format!("/v1beta/{operation_name}"));
        let url = url.as_str();
        let client = &self.client;
        let provider = ctx.descriptor.name;

        let mut state = PollState::new(operation_name);
        poll_until_done(provider, &mut state, self.poll, ctx.cancel, move || async move {
            let operation: Veo2Operation =
                get_json(ctx, client, url, Auth::Header(API_KEY_HEADER, api_key)).await?;
            operation.into_step(provider)
        })
        .await
    }
}

#[async_trait]
impl VideoAdapter for Veo2Adapter {
    fn provider_id(&self) -> &'static str {
        "veo-2"
    }

    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let api_key = ctx.require_api_key()?;

        let operation = self.submit(&ctx, api_key, request).await?;
        tracing::info!(operation = %operation, "Veo 2 generation started");

        let videos = self.poll_until_ready(&ctx, api_key, &operation).await?;
        tracing::debug!(operation = %operation, count = videos.len(), "Veo 2 generation complete");

        Ok(GenerationResult::success(
            ctx.descriptor.id,
            videos,
            Some(request_cost(ctx.descriptor, request)),
        ))
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Veo2Request {
    instances: Vec<Veo2Instance>,
    parameters: Veo2Parameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Veo2Instance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<Veo2Image>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Veo2Image {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Veo2Parameters {
    aspect_ratio: String,
    duration_seconds: u32,
    sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
}

impl Veo2Request {
    fn from_request(req: &GenerationRequest, descriptor: &ProviderDescriptor) -> Self {
        let caps = &descriptor.capabilities;

        let mut instance = Veo2Instance {
            prompt: req.prompt.clone(),
            image: None,
        };
        if caps.supports_conditioning_image {
            instance.image = req.conditioning_image.as_ref().map(|image| Veo2Image {
                bytes_base64_encoded: image.image_bytes.clone(),
                mime_type: image.mime_type.clone(),
            });
        }

        let mut parameters = Veo2Parameters {
            aspect_ratio: req.aspect_ratio.clone(),
            duration_seconds: req.duration_secs,
            sample_count: req.number_of_videos.min(descriptor.max_videos()),
            negative_prompt: None,
        };
        if caps.supports_negative_prompt {
            parameters.negative_prompt = req.negative_prompt.clone();
        }

        Self {
            instances: vec![instance],
            parameters,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Veo2Operation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<Veo2OperationError>,
    #[serde(default)]
    response: Option<Veo2OperationResult>,
}

#[derive(Debug, Deserialize)]
struct Veo2OperationError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Veo2OperationResult {
    #[serde(default)]
    generate_video_response: Option<Veo2VideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Veo2VideoResponse {
    #[serde(default)]
    generated_samples: Vec<Veo2Sample>,
}

#[derive(Debug, Deserialize)]
struct Veo2Sample {
    #[serde(default)]
    video: Option<Veo2Video>,
}

#[derive(Debug, Deserialize)]
struct Veo2Video {
    #[serde(default)]
    uri: Option<String>,
}

impl Veo2Operation {
    fn into_step(self, provider: &str) -> Result<PollStep<Vec<String>>> {
        if let Some(err) = self.error {
            return Ok(PollStep::Failed(
                err.message.unwrap_or_else(|| "Unknown error".into()),
            ));
        }
        if !self.done.unwrap_or(false) {
            return Ok(PollStep::Pending("running".into()));
        }

        let videos: Vec<String> = self
            .response
            .and_then(|r| r.generate_video_response)
            .map(|r| r.generated_samples)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.video.and_then(|v| v.uri))
            .filter(|uri| !uri.is_empty())
            .collect();

        if videos.is_empty() {
            return Err(VidGenError::NoVideoReturned(provider.to_string()));
        }
        Ok(PollStep::Completed(videos))
    }
}
