//! Video generation: request types, normalization, dispatch and adapters.

mod normalize;
mod poll;
mod provider;
pub mod providers;
mod router;
mod types;

pub use normalize::{normalize_request, RawGenerationParams, RawImage};
pub use poll::{poll_until_done, PollConfig, PollState, PollStatus, PollStep};
pub use provider::{AdapterContext, VideoAdapter};
pub use router::{VideoRouter, VideoRouterBuilder};
pub use types::{ConditioningImage, GenerationRequest, GenerationResult, ProviderOptions};
