//! Video generation adapters.

#[cfg(any(
    feature = "runway",
    feature = "luma",
    feature = "stability",
    feature = "sora",
    feature = "veo"
))]
pub(crate) mod http;

#[cfg(feature = "runway")]
mod runway;
#[cfg(feature = "runway")]
pub use runway::{RunwayAdapter, RunwayAdapterBuilder, RunwayModel};

#[cfg(feature = "luma")]
mod luma;
#[cfg(feature = "luma")]
pub use luma::{LumaAdapter, LumaAdapterBuilder, LumaModel};

#[cfg(feature = "stability")]
mod stability;
#[cfg(feature = "stability")]
pub use stability::{StabilityAdapter, StabilityAdapterBuilder, StabilityModel};

#[cfg(feature = "sora")]
mod sora;
#[cfg(feature = "sora")]
pub use sora::{SoraAdapter, SoraAdapterBuilder, SoraModel};

#[cfg(feature = "veo")]
mod veo2;
#[cfg(feature = "veo")]
pub use veo2::{Veo2Adapter, Veo2AdapterBuilder, Veo2Model};

#[cfg(feature = "veo")]
mod veo3;
#[cfg(feature = "veo")]
pub use veo3::{Veo3Adapter, Veo3AdapterBuilder};
