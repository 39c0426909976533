//! Video adapter trait.

use crate::error::{Result, VidGenError};
use crate::registry::ProviderDescriptor;
use crate::video::types::{GenerationRequest, GenerationResult};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Everything an adapter needs for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    /// Capability descriptor of the target provider.
    pub descriptor: &'static ProviderDescriptor,
    /// Credential resolved by the caller, if any.
    pub api_key: Option<&'a str>,
    /// Fires when the caller abandons the call.
    pub cancel: &'a CancellationToken,
}

impl<'a> AdapterContext<'a> {
    /// Returns the credential, or `MissingCredential` naming the provider.
    pub fn require_api_key(&self) -> Result<&'a str> {
        self.api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| VidGenError::MissingCredential {
                provider: self.descriptor.name.to_string(),
            })
    }

    /// Runs `fut` unless the call is cancelled first.
    pub async fn cancellable<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(VidGenError::Cancelled),
            res = fut => res,
        }
    }
}

/// Protocol adapter for one video generation provider.
///
/// An adapter turns a validated [`GenerationRequest`] into the provider's
/// wire format, talks to its HTTP API and normalizes the response.
#[async_trait]
pub trait VideoAdapter: Send + Sync {
    /// Registry id this adapter serves (e.g. `"luma"`).
    fn provider_id(&self) -> &'static str;

    /// Runs one generation call to completion.
    async fn generate(
        &self,
        ctx: AdapterContext<'_>,
        request: &GenerationRequest,
    ) -> Result<GenerationResult>;
}
