//! Demand model port.
//!
//! A demand model answers one question: given a market context and a
//! candidate price, what is the probability the ride is taken? Multiple
//! interchangeable variants live behind this trait so the pipeline can
//! cross-check them for agreement.

use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use serde::Serialize;

/// Names of the encoded model features, index-aligned with
/// [`DemandFeatures::vector`]. Artifacts reference features by index, so
/// this ordering is part of the model contract.
pub const FEATURE_NAMES: [&str; 8] = [
    "supply_demand_ratio",
    "price_to_cost_ratio",
    "location",
    "time_of_booking",
    "vehicle_type",
    "loyalty_tier",
    "average_rating",
    "past_rides",
];

/// Upper clip for the supply/demand ratio feature. A zero-rider context
/// reports an infinite ratio; models see it as "deeply oversupplied".
const RATIO_CLIP: f64 = 10.0;

/// Encoded inputs handed to a demand model.
#[derive(Debug, Clone)]
pub struct DemandFeatures {
    pub price: f64,
    pub cost: f64,
    /// Multiplicative demand adjustment from external factors
    /// (weather, events, fuel). Neutral is 1.0.
    pub external_adjustment: f64,
    features: [f64; 8],
}

impl DemandFeatures {
    pub fn from_context(
        ctx: &MarketContext,
        price: f64,
        external_adjustment: f64,
    ) -> Self {
        let cost = ctx.historical_cost_of_ride;
        let features = [
            ctx.supply_demand_ratio().min(RATIO_CLIP),
            if cost > 0.0 { price / cost } else { 1.0 },
            ctx.location_category.encoding(),
            ctx.time_of_booking.encoding(),
            ctx.vehicle_type.encoding(),
            ctx.customer_loyalty_status.encoding(),
            ctx.average_ratings,
            ctx.number_of_past_rides as f64,
        ];
        Self {
            price,
            cost,
            external_adjustment,
            features,
        }
    }

    pub fn vector(&self) -> &[f64; 8] {
        &self.features
    }
}

/// One feature's contribution to a model's output: an unsigned importance
/// for tree ensembles, a signed coefficient for linear models.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub weight: f64,
}

pub trait DemandModel: Send + Sync {
    /// Registry key for this model variant.
    fn name(&self) -> &str;

    /// Demand probability for the given features. `elasticity_modifier`
    /// scales the model's own elasticity parameter (1.0 = as trained);
    /// sensitivity scenarios perturb it without touching the context.
    /// Raw output may fall outside [0, 1]; the registry clamps.
    fn predict(&self, features: &DemandFeatures, elasticity_modifier: f64)
        -> Result<f64, DomainError>;

    /// Per-feature importances or coefficients for explainability, when
    /// the model variant supports them.
    fn explain(&self) -> Option<Vec<FeatureContribution>>;
}
