//! VidGen - Unified dispatch for AI video generation providers.
//!
//! This crate describes every supported provider in a static registry,
//! prices requests, validates caller input, and routes each request to a
//! protocol adapter that speaks the provider's HTTP API.
//!
//! # Quick Start
//!
//! ```no_run
//! use vidgen::{RawGenerationParams, VideoRouter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = VideoRouter::new();
//!     let mut params = RawGenerationParams::new("veo-3", "A cat playing with a ball");
//!     params.duration_seconds = Some("8".into());
//!
//!     let key = std::env::var("VEO3_API_KEY").ok();
//!     let result = router.submit(&params, key.as_deref()).await;
//!     match result.error {
//!         None => println!("{:?} (cost {:?})", result.videos, result.cost),
//!         Some(err) => eprintln!("failed: {err}"),
//!     }
//! }
//! ```
//!
//! # Providers
//!
//! ```
//! use vidgen::{estimate_cost, get_providers_by_budget};
//!
//! for provider in get_providers_by_budget(0.05) {
//!     let estimate = estimate_cost(provider, 10, 1);
//!     println!("{}: {:.2} {}", provider.name, estimate.total, estimate.currency);
//! }
//! ```
//!
//! # Features
//!
//! ## Video Adapters
//! - `runway`: RunwayML Gen-4
//! - `luma`: Luma Dream Machine
//! - `stability`: Stability AI
//! - `sora`: OpenAI Sora
//! - `veo`: Google Veo 2 (Gemini API) and Veo 3 (veo3gen)
//!
//! ## Meta Features
//! - `video`: All video adapters
//! - `cli`: Command-line interface

mod cost;
mod error;
mod registry;
pub mod video;

// Re-export error types at crate root
pub use error::{ErrorKind, Result, VidGenError};

pub use cost::{calculate_cost, estimate_cost, CostEstimate, PriceTier};
pub use registry::{
    find_by_credential_env, get_all_providers, get_provider_by_id, get_providers_by_budget,
    provider_ids, AuthType, Capabilities, FreeTier, Pricing, ProviderDescriptor, PROVIDERS,
};

pub use video::{
    normalize_request, AdapterContext, ConditioningImage, GenerationRequest, GenerationResult,
    PollConfig, ProviderOptions, RawGenerationParams, RawImage, VideoAdapter, VideoRouter,
    VideoRouterBuilder,
};

#[cfg(feature = "runway")]
pub use video::providers::{RunwayAdapter, RunwayAdapterBuilder, RunwayModel};

#[cfg(feature = "luma")]
pub use video::providers::{LumaAdapter, LumaAdapterBuilder, LumaModel};

#[cfg(feature = "stability")]
pub use video::providers::{StabilityAdapter, StabilityAdapterBuilder, StabilityModel};

#[cfg(feature = "sora")]
pub use video::providers::{SoraAdapter, SoraAdapterBuilder, SoraModel};

#[cfg(feature = "veo")]
pub use video::providers::{
    Veo2Adapter, Veo2AdapterBuilder, Veo2Model, Veo3Adapter, Veo3AdapterBuilder,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorKind, Result, VidGenError};
    pub use crate::registry::{get_provider_by_id, ProviderDescriptor};
    pub use crate::video::{
        GenerationRequest, GenerationResult, RawGenerationParams, VideoAdapter, VideoRouter,
    };
}
