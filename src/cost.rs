//! Cost calculation for video generation.

use crate::registry::ProviderDescriptor;
use serde::Serialize;

/// Price band of a provider, by cost per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    /// Up to 0.03 per second.
    Budget,
    /// Up to 0.05 per second.
    Standard,
    /// Everything above.
    Premium,
}

impl PriceTier {
    /// Classifies a per-second price.
    pub fn for_cost_per_second(cost_per_second: f64) -> Self {
        if cost_per_second <= 0.03 {
            Self::Budget
        } else if cost_per_second <= 0.05 {
            Self::Standard
        } else {
            Self::Premium
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budget => write!(f, "budget"),
            Self::Standard => write!(f, "standard"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

/// Returns `cost_per_second * total_seconds` for the provider.
///
/// `total_seconds` is the clip duration times the number of videos when
/// estimating multi-video jobs. No rounding is applied; format for display.
pub fn calculate_cost(descriptor: &ProviderDescriptor, total_seconds: f64) -> f64 {
    descriptor.pricing.cost_per_second * total_seconds
}

/// A priced breakdown of a prospective job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub provider: &'static str,
    pub total: f64,
    pub currency: &'static str,
    pub cost_per_second: f64,
    pub billable_seconds: u32,
    /// Monthly free allowance, if any. Not deducted from `total`.
    pub free_tier_seconds: Option<u32>,
    pub tier: PriceTier,
}

/// Estimates the cost of generating `number_of_videos` clips of
/// `duration_seconds` each.
pub fn estimate_cost(
    descriptor: &'static ProviderDescriptor,
    duration_seconds: u32,
    number_of_videos: u32,
) -> CostEstimate {
    let billable_seconds = duration_seconds.saturating_mul(number_of_videos);
    CostEstimate {
        provider: descriptor.id,
        total: calculate_cost(descriptor, f64::from(billable_seconds)),
        currency: descriptor.pricing.currency,
        cost_per_second: descriptor.pricing.cost_per_second,
        billable_seconds,
        free_tier_seconds: descriptor.pricing.free_tier.as_ref().map(|t| t.seconds),
        tier: PriceTier::for_cost_per_second(descriptor.pricing.cost_per_second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{get_all_providers, get_provider_by_id};

    #[test]
    fn test_calculate_cost_matches_rate() {
        for p in get_all_providers() {
            for s in [0.0, 1.0, 5.0, 12.5, 60.0] {
                assert_eq!(calculate_cost(p, s), p.pricing.cost_per_second * s);
            }
        }
    }

    #[test]
    fn test_calculate_cost_is_linear_and_non_negative() {
        for p in get_all_providers() {
            let a = calculate_cost(p, 3.0);
            let b = calculate_cost(p, 7.0);
            assert!(a >= 0.0 && b >= 0.0);
            assert!((calculate_cost(p, 10.0) - (a + b)).abs() < 1e-9);
            assert_eq!(calculate_cost(p, 0.0), 0.0);
        }
    }

    #[test]
    fn test_estimate_multiplies_duration_and_count() {
        let runway = get_provider_by_id("runwayml").unwrap();
        let estimate = estimate_cost(runway, 10, 3);
        assert_eq!(estimate.billable_seconds, 30);
        assert!((estimate.total - 1.5).abs() < 1e-9);
        assert_eq!(estimate.currency, "USD");
        assert_eq!(estimate.free_tier_seconds, Some(125));
        assert_eq!(estimate.tier, PriceTier::Standard);
    }

    #[test]
    fn test_price_tiers() {
        assert_eq!(PriceTier::for_cost_per_second(0.01), PriceTier::Budget);
        assert_eq!(PriceTier::for_cost_per_second(0.03), PriceTier::Budget);
        assert_eq!(PriceTier::for_cost_per_second(0.05), PriceTier::Standard);
        assert_eq!(PriceTier::for_cost_per_second(0.35), PriceTier::Premium);
        assert_eq!(PriceTier::Premium.to_string(), "premium");
    }
}
