//! Veo 3 video generation adapter (veo3gen task API).
//!
//! Generation is job-based: a POST to `/api/generate` returns a task id, and
//! `/api/status/{taskId}` is polled until the task completes, fails or the
//! local ceiling elapses.

use crate::error::{Result, VidGenError};
use crate::registry::ProviderDescriptor;
use crate::video::poll::{poll_until_done, PollConfig, PollState, PollStep};
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::providers::http::{get_json, join_url, post_json, request_cost, Auth, OptionalFields};
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.veo3gen.app";
const GENERATE_PATH: &str = "/api/generate";
const STATUS_PATH: &str = "/api/status";

const DEFAULT_MODEL_TIER: &str = "veo3-fast";
const DEFAULT_RESOLUTION: &str = "720p";

/// Builder for Veo3Adapter.
#[derive(Debug, Clone)]
pub struct Veo3AdapterBuilder {
    base_url: String,
    poll: PollConfig,
    client: Option<reqwest::Client>,
}

impl Default for Veo3AdapterBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            poll: PollConfig::default(),
            client: None,
        }
    }
}

impl Veo3AdapterBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
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
    pub fn build(self) -> Veo3Adapter {
        Veo3Adapter {
            client: self.client.unwrap_or_default(),
            base_url: self.base_url,
            poll: self.poll,
        }
    }
}

/// Veo 3 adapter.
pub struct Veo3Adapter {
    client: reqwest::Client,
    base_url: String,
    poll: PollConfig,
}

impl Veo3Adapter {
    /// Creates a new `Veo3AdapterBuilder`.
    pub fn builder() -> Veo3AdapterBuilder {
        Veo3AdapterBuilder::new()
    }

    /// Submit a generation task. Returns the task id.
    async fn submit(
        &self,
        ctx: &AdapterContext<'_>,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String> {
        let body = Veo3Request::from_request(request, ctx.descriptor);
        let url = join_url(&self.base_url, GENERATE_PATH);

        let response: Veo3SubmitResponse =
            post_json(ctx, &self.client, &url, Auth::Bearer(api_key), &body).await?;

        response
            .task_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| VidGenError::NoTaskId(ctx.descriptor.name.to_string()))
    }

    /// Poll until the task completes. Returns the video URL and the charged
    /// credits, if reported.
    async fn poll_until_ready(
        &self,
        ctx: &AdapterContext<'_>,
        api_key: &str,
        task_id: &str,
    ) -> Result<(String, Option<f64>)> {
        let url = join_url(&self.base_url, &format!("{STATUS_PATH}/{task_id}"));
        let url = url.as_str();
        let client = &self.client;
        let provider = ctx.descriptor.name;

        let mut state = PollState::new(task_id);
        poll_until_done(provider, &mut state, self.poll, ctx.cancel, move || async move {
            let status: Veo3StatusResponse =
                get_json(ctx, client, url, Auth::Bearer(api_key)).await?;
            status.into_step(provider)
        })
        .await
    }
}

#[async_trait]
impl VideoAdapter for Veo3Adapter {
    fn provider_id(&self) -> &'static str {
        "veo-3"
    }

    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let api_key = ctx.require_api_key()?;

        let task_id = self.submit(&ctx, api_key, request).await?;
        tracing::info!(task_id = %task_id, "VEO3 generation started");

        let (video_url, charged) = self.poll_until_ready(&ctx, api_key, &task_id).await?;
        tracing::debug!(task_id = %task_id, url = %video_url, "VEO3 generation complete");

        let cost = charged.unwrap_or_else(|| request_cost(ctx.descriptor, request));
        Ok(GenerationResult::success(
            ctx.descriptor.id,
            vec![video_url],
            Some(cost),
        ))
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct Veo3Request {
    model: String,
    prompt: String,
    audio: bool,
    options: Veo3Options,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Veo3Options {
    resolution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl Veo3Request {
    fn from_request(req: &GenerationRequest, descriptor: &ProviderDescriptor) -> Self {
        let caps = &descriptor.capabilities;
        let optional = OptionalFields::from_request(descriptor, req);

        let model = req
            .options
            .model_tier
            .clone()
            .filter(|_| !caps.model_tiers.is_empty())
            .unwrap_or_else(|| {
                caps.model_tiers
                    .first()
                    .copied()
                    .unwrap_or(DEFAULT_MODEL_TIER)
                    .to_string()
            });
        let audio = caps.supports_audio && req.options.audio.unwrap_or(true);

        Self {
            model,
            prompt: req.prompt.clone(),
            audio,
            options: Veo3Options {
                resolution: optional
                    .resolution
                    .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string()),
                negative_prompt: optional.negative_prompt,
                image: optional.image_data_uri,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Veo3SubmitResponse {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Veo3StatusResponse {
    status: String,
    #[serde(default)]
    result: Option<Veo3Result>,
    #[serde(default)]
    credits: Option<Veo3Credits>,
    #[serde(default)]
    error: Option<Veo3Error>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Veo3Result {
    #[serde(default)]
    video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Veo3Credits {
    #[serde(default)]
    charged: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Veo3Error {
    #[serde(default)]
    message: Option<String>,
}

impl Veo3StatusResponse {
    fn into_step(self, provider: &str) -> Result<PollStep<(String, Option<f64>)>> {
        match self.status.as_str() {
            "completed" => {
                let url = self
                    .result
                    .and_then(|r| r.video_url)
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| VidGenError::NoVideoReturned(provider.to_string()))?;
                let charged = self.credits.and_then(|c| c.charged);
                Ok(PollStep::Completed((url, charged)))
            }
            "failed" => Ok(PollStep::Failed(
                self.error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Generation failed".into()),
            )),
            "timeout" => Ok(PollStep::TimedOut),
            _ => Ok(PollStep::Pending(self.status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::get_provider_by_id;
    use crate::video::types::{ConditioningImage, ProviderOptions};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor() -> &'static ProviderDescriptor {
        get_provider_by_id("veo-3").unwrap()
    }

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(500),
        }
    }

    async fn run(server: &MockServer, poll: PollConfig) -> Result<GenerationResult> {
        let adapter = Veo3Adapter::builder()
            .base_url(server.uri())
            .poll_config(poll)
            .build();
        let cancel = CancellationToken::new();
        let ctx = AdapterContext {
            descriptor: descriptor(),
            api_key: Some("veo-key"),
            cancel: &cancel,
        };
        adapter
            .generate(ctx, &GenerationRequest::new("veo-3", "A fox in snow").with_duration(8))
            .await
    }

    async fn mount_submit(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(header("Authorization", "Bearer veo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_default_endpoint_matches_registry() {
        assert_eq!(join_url(BASE_URL, GENERATE_PATH), descriptor().api_endpoint);
    }

    #[test]
    fn test_request_defaults() {
        let req = GenerationRequest::new("veo-3", "A fox");
        let json = serde_json::to_value(Veo3Request::from_request(&req, descriptor())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "veo3-fast",
                "prompt": "A fox",
                "audio": true,
                "options": { "resolution": "720p" }
            })
        );
    }

    #[test]
    fn test_request_with_all_options() {
        let req = GenerationRequest::new("veo-3", "A fox")
            .with_negative_prompt("cars")
            .with_conditioning_image(ConditioningImage::from_bytes(b"abc", "image/png"))
            .with_options(ProviderOptions {
                model_tier: Some("veo3-quality".into()),
                resolution: Some("1080p".into()),
                audio: Some(false),
                fps: None,
            });
        let json = serde_json::to_value(Veo3Request::from_request(&req, descriptor())).unwrap();

        assert_eq!(json["model"], "veo3-quality");
        assert_eq!(json["audio"], false);
        assert_eq!(json["options"]["resolution"], "1080p");
        assert_eq!(json["options"]["negativePrompt"], "cars");
        assert_eq!(json["options"]["image"], "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_status_response_steps() {
        let pending: Veo3StatusResponse =
            serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert!(matches!(pending.into_step("VEO3").unwrap(), PollStep::Pending(s) if s == "processing"));

        let failed: Veo3StatusResponse =
            serde_json::from_str(r#"{"status": "failed", "error": {"message": "nsfw"}}"#).unwrap();
        assert!(matches!(failed.into_step("VEO3").unwrap(), PollStep::Failed(m) if m == "nsfw"));

        let timeout: Veo3StatusResponse =
            serde_json::from_str(r#"{"status": "timeout"}"#).unwrap();
        assert!(matches!(timeout.into_step("VEO3").unwrap(), PollStep::TimedOut));

        let empty: Veo3StatusResponse =
            serde_json::from_str(r#"{"status": "completed", "result": {}}"#).unwrap();
        assert_eq!(
            empty.into_step("VEO3").unwrap_err().kind(),
            ErrorKind::NoVideoReturned
        );
    }

    #[tokio::test]
    async fn test_generate_polls_until_completed() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"taskId": "task-42"})).await;

        Mock::given(method("GET"))
            .and(path("/api/status/task-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "pending"
            })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/status/task-42"))
            .and(header("Authorization", "Bearer veo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "completed",
                "result": { "videoUrl": "https://cdn.veo3/fox.mp4" },
                "credits": { "charged": 0.5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = run(&server, fast_poll()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.videos, vec!["https://cdn.veo3/fox.mp4"]);
        assert_eq!(result.cost, Some(0.5));
    }

    #[tokio::test]
    async fn test_generate_cost_falls_back_to_rate() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"taskId": "t"})).await;
        Mock::given(method("GET"))
            .and(path("/api/status/t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "completed",
                "result": { "videoUrl": "https://cdn.veo3/t.mp4" }
            })))
            .mount(&server)
            .await;

        let result = run(&server, fast_poll()).await.unwrap();
        // 0.08/s * 8s
        assert!((result.cost.unwrap() - 0.64).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_generate_without_task_id() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"ok": true})).await;

        let err = run(&server, fast_poll()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoTaskId);
    }

    #[tokio::test]
    async fn test_generate_failed_job() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"taskId": "bad"})).await;
        Mock::given(method("GET"))
            .and(path("/api/status/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "failed",
                "error": { "message": "prompt rejected" }
            })))
            .mount(&server)
            .await;

        let err = run(&server, fast_poll()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenerationFailed);
        assert!(err.to_string().contains("prompt rejected"));
    }

    #[tokio::test]
    async fn test_generate_provider_timeout() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"taskId": "slow"})).await;
        Mock::given(method("GET"))
            .and(path("/api/status/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "timeout"})),
            )
            .mount(&server)
            .await;

        let err = run(&server, fast_poll()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderTimeout);
    }

    #[tokio::test]
    async fn test_generate_client_timeout() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"taskId": "stuck"})).await;
        Mock::given(method("GET"))
            .and(path("/api/status/stuck"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})),
            )
            .mount(&server)
            .await;

        let poll = PollConfig {
            interval: Duration::from_millis(20),
            timeout: Duration::from_millis(100),
        };
        let err = run(&server, poll).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientTimeout);

        let polls_at_timeout = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "GET")
            .count();
        assert!(polls_at_timeout >= 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let polls_later = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "GET")
            .count();
        assert_eq!(polls_at_timeout, polls_later);
    }

    #[tokio::test]
    async fn test_status_check_http_error() {
        let server = MockServer::start().await;
        mount_submit(&server, serde_json::json!({"taskId": "t1"})).await;
        Mock::given(method("GET"))
            .and(path("/api/status/t1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired key"))
            .mount(&server)
            .await;

        let err = run(&server, fast_poll()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    }

    #[tokio::test]
    async fn test_submit_body_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "veo3-fast",
                "prompt": "A fox in snow",
                "audio": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let err = run(&server, fast_poll()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoTaskId);
    }
}
