//! Dispatch router: maps a provider id to its adapter and folds every
//! outcome into a [`GenerationResult`].

use crate::cost::{estimate_cost, CostEstimate};
use crate::error::{Result, VidGenError};
use crate::registry::{get_provider_by_id, PROVIDERS};
use crate::video::normalize::{check_capabilities, normalize_request, RawGenerationParams};
use crate::video::poll::PollConfig;
use crate::video::provider::{AdapterContext, VideoAdapter};
use crate::video::types::{GenerationRequest, GenerationResult};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder for [`VideoRouter`].
pub struct VideoRouterBuilder {
    client: Option<reqwest::Client>,
    poll: PollConfig,
    defaults: bool,
    adapters: Vec<Arc<dyn VideoAdapter>>,
}

impl Default for VideoRouterBuilder {
    fn default() -> Self {
        Self {
            client: None,
            poll: PollConfig::default(),
            defaults: true,
            adapters: Vec::new(),
        }
    }
}

impl VideoRouterBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares one HTTP client across all built-in adapters.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Polling interval and ceiling for the job-based adapters.
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Skips registration of the built-in adapters.
    pub fn without_defaults(mut self) -> Self {
        self.defaults = false;
        self
    }

    /// Registers an adapter, replacing any built-in one with the same id.
    pub fn adapter(mut self, adapter: Arc<dyn VideoAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Builds the router.
    pub fn build(self) -> VideoRouter {
        let mut adapters: HashMap<&'static str, Arc<dyn VideoAdapter>> = HashMap::new();

        if self.defaults {
            let client = self.client.unwrap_or_default();
            for adapter in default_adapters(client, self.poll) {
                adapters.insert(adapter.provider_id(), adapter);
            }
        }
        for adapter in self.adapters {
            adapters.insert(adapter.provider_id(), adapter);
        }

        VideoRouter { adapters }
    }
}

// Partial feature sets leave `client`, `poll` or the push list untouched.
#[cfg_attr(not(feature = "video"), allow(unused_variables, unused_mut))]
fn default_adapters(client: reqwest::Client, poll: PollConfig) -> Vec<Arc<dyn VideoAdapter>> {
    let mut adapters: Vec<Arc<dyn VideoAdapter>> = Vec::new();

    #[cfg(feature = "veo")]
    {
        use crate::video::providers::{Veo2Adapter, Veo3Adapter};
        adapters.push(Arc::new(
            Veo2Adapter::builder()
                .client(client.clone())
                .poll_config(poll)
                .build(),
        ));
        adapters.push(Arc::new(
            Veo3Adapter::builder()
                .client(client.clone())
                .poll_config(poll)
                .build(),
        ));
    }

    #[cfg(feature = "runway")]
    adapters.push(Arc::new(
        crate::video::providers::RunwayAdapter::builder()
            .client(client.clone())
            .build(),
    ));

    #[cfg(feature = "luma")]
    adapters.push(Arc::new(
        crate::video::providers::LumaAdapter::builder()
            .client(client.clone())
            .build(),
    ));

    #[cfg(feature = "stability")]
    adapters.push(Arc::new(
        crate::video::providers::StabilityAdapter::builder()
            .client(client.clone())
            .build(),
    ));

    #[cfg(feature = "sora")]
    adapters.push(Arc::new(
        crate::video::providers::SoraAdapter::builder()
            .client(client)
            .build(),
    ));

    adapters
}

/// Routes generation requests to provider adapters.
///
/// Every call returns a [`GenerationResult`]; lookup failures, adapter
/// errors and adapter panics all come back as failure results rather than
/// as `Err` or an unwinding panic.
///
/// ```no_run
/// use vidgen::{GenerationRequest, VideoRouter};
///
/// # async fn run() {
/// let router = VideoRouter::new();
/// let request = GenerationRequest::new("luma", "A fox running through snow");
/// let key = std::env::var("LUMA_API_KEY").ok();
/// let result = router.generate_video("luma", &request, key.as_deref()).await;
/// if result.success {
///     println!("{}", result.videos[0]);
/// }
/// # }
/// ```
pub struct VideoRouter {
    adapters: HashMap<&'static str, Arc<dyn VideoAdapter>>,
}

impl Default for VideoRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoRouter {
    /// Creates a router with every feature-enabled adapter.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new `VideoRouterBuilder`.
    pub fn builder() -> VideoRouterBuilder {
        VideoRouterBuilder::new()
    }

    /// Returns true if an adapter is registered for `provider_id`.
    pub fn is_implemented(&self, provider_id: &str) -> bool {
        self.adapters.contains_key(provider_id)
    }

    /// Ids with a registered adapter, in registry order.
    pub fn implemented_providers(&self) -> Vec<&'static str> {
        PROVIDERS
            .iter()
            .map(|p| p.id)
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }

    /// Estimates the cost of a request without dispatching it.
    pub fn estimate(
        &self,
        provider_id: &str,
        duration_seconds: u32,
        number_of_videos: u32,
    ) -> Result<CostEstimate> {
        let descriptor = get_provider_by_id(provider_id)
            .ok_or_else(|| VidGenError::ProviderNotFound(provider_id.to_string()))?;
        Ok(estimate_cost(descriptor, duration_seconds, number_of_videos))
    }

    /// Generates video with the adapter registered for `provider_id`.
    pub async fn generate_video(
        &self,
        provider_id: &str,
        request: &GenerationRequest,
        api_key: Option<&str>,
    ) -> GenerationResult {
        let cancel = CancellationToken::new();
        self.generate_video_with_cancel(provider_id, request, api_key, &cancel)
            .await
    }

    /// Like [`generate_video`](Self::generate_video), but gives up with a
    /// `Cancelled` failure once `cancel` fires.
    pub async fn generate_video_with_cancel(
        &self,
        provider_id: &str,
        request: &GenerationRequest,
        api_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        let Some(descriptor) = get_provider_by_id(provider_id) else {
            let err = VidGenError::ProviderNotFound(provider_id.to_string());
            tracing::warn!(provider = provider_id, "unknown video provider");
            return GenerationResult::failure(provider_id, &err);
        };

        tracing::info!(provider = descriptor.id, "generating video with {}", descriptor.name);

        let Some(adapter) = self.adapters.get(descriptor.id) else {
            let err = VidGenError::ProviderNotImplemented(descriptor.id.to_string());
            tracing::warn!(provider = descriptor.id, "no adapter registered");
            return GenerationResult::failure(descriptor.id, &err);
        };

        if let Err(err) = check_capabilities(descriptor, request) {
            tracing::warn!(provider = descriptor.id, error = %err, "request outside provider capabilities");
            return GenerationResult::failure(descriptor.id, &err);
        }

        let ctx = AdapterContext {
            descriptor,
            api_key,
            cancel,
        };

        match AssertUnwindSafe(adapter.generate(ctx, request))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                tracing::warn!(provider = descriptor.id, error = %err, "video generation failed");
                GenerationResult::failure(descriptor.id, &err)
            }
            Err(payload) => {
                let err = VidGenError::Internal(panic_message(payload.as_ref()));
                tracing::warn!(provider = descriptor.id, error = %err, "video adapter panicked");
                GenerationResult::failure(descriptor.id, &err)
            }
        }
    }

    /// Normalizes raw caller input and dispatches it.
    ///
    /// Invalid input yields an `InvalidRequest` failure without contacting
    /// any provider.
    pub async fn submit(&self, raw: &RawGenerationParams, api_key: Option<&str>) -> GenerationResult {
        match normalize_request(raw) {
            Ok(request) => self.generate_video(&request.provider, &request, api_key).await,
            Err(err) => {
                tracing::warn!(provider = %raw.provider, error = %err, "rejected generation request");
                GenerationResult::failure(raw.provider.trim(), &err)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "adapter panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedAdapter {
        id: &'static str,
        result: GenerationResult,
        calls: AtomicUsize,
    }

    impl FixedAdapter {
        fn new(id: &'static str, result: GenerationResult) -> Arc<Self> {
            Arc::new(Self {
                id,
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VideoAdapter for FixedAdapter {
        fn provider_id(&self) -> &'static str {
            self.id
        }

        async fn generate(
            &self,
            _ctx: AdapterContext<'_>,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    struct FailingAdapter;

    #[async_trait]
    impl VideoAdapter for FailingAdapter {
        fn provider_id(&self) -> &'static str {
            "luma"
        }

        async fn generate(
            &self,
            ctx: AdapterContext<'_>,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult> {
            Err(VidGenError::from_status(ctx.descriptor.name, 429, "slow down"))
        }
    }

    struct PanickingAdapter;

    #[async_trait]
    impl VideoAdapter for PanickingAdapter {
        fn provider_id(&self) -> &'static str {
            "stability"
        }

        async fn generate(
            &self,
            _ctx: AdapterContext<'_>,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult> {
            panic!("decoder exploded");
        }
    }

    struct KeyEchoAdapter;

    #[async_trait]
    impl VideoAdapter for KeyEchoAdapter {
        fn provider_id(&self) -> &'static str {
            "openai-sora"
        }

        async fn generate(
            &self,
            ctx: AdapterContext<'_>,
            request: &GenerationRequest,
        ) -> Result<GenerationResult> {
            let key = ctx.require_api_key()?;
            Ok(GenerationResult::success(
                ctx.descriptor.id,
                vec![format!("{key}:{}", request.prompt)],
                None,
            ))
        }
    }

    struct HangingAdapter;

    #[async_trait]
    impl VideoAdapter for HangingAdapter {
        fn provider_id(&self) -> &'static str {
            "veo-3"
        }

        async fn generate(
            &self,
            ctx: AdapterContext<'_>,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult> {
            ctx.cancellable(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(GenerationResult::success(ctx.descriptor.id, Vec::new(), None))
            })
            .await
        }
    }

    fn mock_router(adapters: Vec<Arc<dyn VideoAdapter>>) -> VideoRouter {
        adapters
            .into_iter()
            .fold(VideoRouter::builder().without_defaults(), |b, a| b.adapter(a))
            .build()
    }

    #[tokio::test]
    async fn test_unknown_provider_is_not_found() {
        let router = mock_router(Vec::new());
        let req = GenerationRequest::new("nonexistent", "x");
        let result = router.generate_video("nonexistent", &req, Some("k")).await;

        assert!(!result.success);
        assert_eq!(result.provider, "nonexistent");
        assert_eq!(result.error_kind, Some(ErrorKind::ProviderNotFound));
        assert_eq!(result.error.as_deref(), Some("provider nonexistent not found"));
    }

    #[tokio::test]
    async fn test_registered_provider_without_adapter() {
        let router = mock_router(Vec::new());
        let req = GenerationRequest::new("runwayml", "x");
        let result = router.generate_video("runwayml", &req, Some("k")).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::ProviderNotImplemented));
        assert!(result.error.unwrap().contains("runwayml"));
    }

    #[tokio::test]
    async fn test_pika_is_never_implemented() {
        let router = VideoRouter::new();
        assert!(!router.is_implemented("pika"));

        let result = router
            .generate_video("pika", &GenerationRequest::new("pika", "x"), Some("k"))
            .await;
        assert_eq!(result.error_kind, Some(ErrorKind::ProviderNotImplemented));
    }

    #[cfg(feature = "video")]
    #[test]
    fn test_default_router_registers_all_adapters() {
        let router = VideoRouter::new();
        assert_eq!(
            router.implemented_providers(),
            vec!["veo-2", "veo-3", "runwayml", "luma", "stability", "openai-sora"]
        );
    }

    #[tokio::test]
    async fn test_adapter_result_passes_through_unmodified() {
        let expected = GenerationResult::success("luma", vec!["https://cdn/a.mp4".into()], Some(0.42));
        let adapter = FixedAdapter::new("luma", expected.clone());
        let router = mock_router(vec![adapter.clone() as Arc<dyn VideoAdapter>]);

        let result = router
            .generate_video("luma", &GenerationRequest::new("luma", "x"), Some("k"))
            .await;
        assert_eq!(result, expected);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_adapter_error_becomes_failure_result() {
        let router = mock_router(vec![Arc::new(FailingAdapter)]);
        let result = router
            .generate_video("luma", &GenerationRequest::new("luma", "x"), Some("k"))
            .await;

        assert!(!result.success);
        assert!(result.videos.is_empty());
        assert_eq!(result.provider, "luma");
        assert_eq!(result.error_kind, Some(ErrorKind::RateLimited));
        assert!(result.error.unwrap().contains("slow down"));
    }

    #[tokio::test]
    async fn test_adapter_panic_becomes_failure_result() {
        let router = mock_router(vec![Arc::new(PanickingAdapter)]);
        let result = router
            .generate_video("stability", &GenerationRequest::new("stability", "x"), Some("k"))
            .await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Unexpected));
        assert_eq!(result.error.as_deref(), Some("internal error: decoder exploded"));
    }

    #[tokio::test]
    async fn test_credential_is_forwarded() {
        let router = mock_router(vec![Arc::new(KeyEchoAdapter)]);
        let req = GenerationRequest::new("openai-sora", "boat");

        let ok = router.generate_video("openai-sora", &req, Some("sk-1")).await;
        assert_eq!(ok.videos, vec!["sk-1:boat"]);

        let missing = router.generate_video("openai-sora", &req, None).await;
        assert_eq!(missing.error_kind, Some(ErrorKind::MissingCredential));
        assert_eq!(missing.error.as_deref(), Some("OpenAI Sora API key required"));
    }

    #[tokio::test]
    async fn test_override_replaces_builtin_adapter() {
        let fixed = FixedAdapter::new(
            "luma",
            GenerationResult::success("luma", vec!["https://mock".into()], None),
        );
        let router = VideoRouter::builder().adapter(fixed.clone()).build();

        let result = router
            .generate_video("luma", &GenerationRequest::new("luma", "x"), None)
            .await;
        assert!(result.success);
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_yields_cancelled_failure() {
        let router = mock_router(vec![Arc::new(HangingAdapter)]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let result = router
            .generate_video_with_cancel("veo-3", &GenerationRequest::new("veo-3", "x"), Some("k"), &cancel)
            .await;
        assert_eq!(result.error_kind, Some(ErrorKind::Cancelled));
        assert_eq!(result.error.as_deref(), Some("generation cancelled"));
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_input_without_dispatch() {
        let adapter = FixedAdapter::new("luma", GenerationResult::success("luma", Vec::new(), None));
        let router = mock_router(vec![adapter.clone() as Arc<dyn VideoAdapter>]);

        let mut raw = RawGenerationParams::new("luma", "Waves");
        raw.duration_seconds = Some("abc".into());
        let result = router.submit(&raw, Some("k")).await;

        assert!(!result.success);
        assert_eq!(result.provider, "luma");
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidRequest));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_dispatches_normalized_request() {
        let router = mock_router(vec![Arc::new(KeyEchoAdapter)]);
        let raw = RawGenerationParams::new("openai-sora", "  A paper boat  ");
        let result = router.submit(&raw, Some("sk")).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.videos, vec!["sk:A paper boat"]);
    }

    #[tokio::test]
    async fn test_out_of_range_request_is_rejected_before_dispatch() {
        let adapter = FixedAdapter::new("luma", GenerationResult::success("luma", Vec::new(), Some(1.0)));
        let router = mock_router(vec![adapter.clone() as Arc<dyn VideoAdapter>]);

        let req = GenerationRequest::new("luma", "Waves")
            .with_duration(60)
            .with_aspect_ratio("21:9")
            .with_number_of_videos(4);
        let result = router.generate_video("luma", &req, Some("k")).await;

        assert!(!result.success);
        assert_eq!(result.provider, "luma");
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidRequest));
        assert_eq!(result.cost, None);
        assert!(result.error.unwrap().contains("60s"));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);

        let blank = GenerationRequest::new("luma", "   ");
        let result = router.generate_video("luma", &blank, Some("k")).await;
        assert_eq!(result.error_kind, Some(ErrorKind::InvalidRequest));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_constructed_request_uses_dispatchable_defaults() {
        let adapter = FixedAdapter::new("veo-3", GenerationResult::success("veo-3", Vec::new(), None));
        let router = mock_router(vec![adapter.clone() as Arc<dyn VideoAdapter>]);

        let result = router
            .generate_video("veo-3", &GenerationRequest::new("veo-3", "Hummingbird"), Some("k"))
            .await;
        assert!(result.success, "{:?}", result.error);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_failure_reports_trimmed_provider() {
        let router = mock_router(Vec::new());
        let mut raw = RawGenerationParams::new(" luma ", "Waves");
        raw.duration_seconds = Some("abc".into());
        let result = router.submit(&raw, Some("k")).await;

        assert_eq!(result.error_kind, Some(ErrorKind::InvalidRequest));
        assert_eq!(result.provider, "luma");
    }

    #[test]
    fn test_estimate() {
        let router = mock_router(Vec::new());
        let estimate = router.estimate("runwayml", 10, 2).unwrap();
        assert_eq!(estimate.billable_seconds, 20);
        assert!((estimate.total - 1.0).abs() < 1e-9);

        assert_eq!(
            router.estimate("nope", 5, 1).unwrap_err().kind(),
            ErrorKind::ProviderNotFound
        );
    }
}
