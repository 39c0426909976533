//! Shared HTTP plumbing for the provider adapters.

use crate::cost::calculate_cost;
use crate::error::{Result, VidGenError};
use crate::registry::ProviderDescriptor;
use crate::video::provider::AdapterContext;
use crate::video::types::{GenerationRequest, GenerationResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How the credential is attached to a request.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Auth<'a> {
    /// `Authorization: Bearer <key>`.
    Bearer(&'a str),
    /// Key sent verbatim in a named header.
    Header(&'static str, &'a str),
}

impl Auth<'_> {
    fn apply(self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Bearer(key) => builder.header("Authorization", format!("Bearer {key}")),
            Self::Header(name, key) => builder.header(name, key),
        }
    }
}

/// Sends a prepared request and decodes a JSON success body.
///
/// Non-success statuses are classified from the status code and the body
/// text, whatever its content type.
pub(crate) async fn send_json<T: DeserializeOwned>(
    ctx: &AdapterContext<'_>,
    builder: reqwest::RequestBuilder,
    auth: Auth<'_>,
) -> Result<T> {
    ctx.cancellable(send(ctx.descriptor.name, builder, auth)).await
}

async fn send<T: DeserializeOwned>(
    provider: &str,
    builder: reqwest::RequestBuilder,
    auth: Auth<'_>,
) -> Result<T> {
    let response = auth.apply(builder).send().await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(VidGenError::from_status(provider, status.as_u16(), &text));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// POSTs a JSON body and decodes the JSON response.
pub(crate) async fn post_json<B, T>(
    ctx: &AdapterContext<'_>,
    client: &reqwest::Client,
    url: &str,
    auth: Auth<'_>,
    body: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let builder = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(body);
    send_json(ctx, builder, auth).await
}

/// GETs a URL and decodes the JSON response.
pub(crate) async fn get_json<T: DeserializeOwned>(
    ctx: &AdapterContext<'_>,
    client: &reqwest::Client,
    url: &str,
    auth: Auth<'_>,
) -> Result<T> {
    send_json(ctx, client.get(url), auth).await
}

/// Success body of the synchronous providers.
///
/// Providers disagree on the field name, so both are accepted.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SyncVideoResponse {
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    video: Option<String>,
}

impl SyncVideoResponse {
    /// Returns `video_url`, falling back to `video`.
    pub(crate) fn into_video_url(self) -> Option<String> {
        let present = |v: &String| !v.trim().is_empty();
        self.video_url
            .filter(present)
            .or_else(|| self.video.filter(present))
    }
}

/// Runs the single-POST flow shared by the synchronous providers: submit,
/// extract the video locator, price the job locally.
pub(crate) async fn generate_sync<B>(
    ctx: &AdapterContext<'_>,
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &B,
    request: &GenerationRequest,
) -> Result<GenerationResult>
where
    B: Serialize + ?Sized,
{
    let descriptor = ctx.descriptor;
    let response: SyncVideoResponse =
        post_json(ctx, client, url, Auth::Bearer(api_key), body).await?;

    let video_url = response
        .into_video_url()
        .ok_or_else(|| VidGenError::NoVideoReturned(descriptor.name.to_string()))?;

    tracing::debug!(provider = descriptor.id, url = %video_url, "video generation complete");

    Ok(GenerationResult::success(
        descriptor.id,
        vec![video_url],
        Some(request_cost(descriptor, request)),
    ))
}

/// Prices a request with the descriptor's rate: duration times count.
pub(crate) fn request_cost(descriptor: &ProviderDescriptor, request: &GenerationRequest) -> f64 {
    let seconds = f64::from(request.duration_secs) * f64::from(request.number_of_videos);
    calculate_cost(descriptor, seconds)
}

/// Optional request fields, filtered by the provider's capabilities.
///
/// A field is only set when the request carries it and the descriptor says
/// the provider accepts it.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct OptionalFields {
    pub negative_prompt: Option<String>,
    pub image_data_uri: Option<String>,
    pub resolution: Option<String>,
    pub fps: Option<u32>,
}

impl OptionalFields {
    pub(crate) fn from_request(
        descriptor: &ProviderDescriptor,
        request: &GenerationRequest,
    ) -> Self {
        let caps = &descriptor.capabilities;
        let mut fields = Self::default();

        if caps.supports_negative_prompt {
            fields.negative_prompt = request.negative_prompt.clone();
        }
        if caps.supports_conditioning_image {
            fields.image_data_uri = request
                .conditioning_image
                .as_ref()
                .map(|image| image.to_data_uri());
        }
        if caps.supports_resolution {
            fields.resolution = request.options.resolution.clone();
        }
        if caps.supports_fps {
            fields.fps = request.options.fps;
        }
        fields
    }
}

/// Joins a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
